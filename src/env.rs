use crate::Error;
use crate::intooperation::IntoOperation;
use crate::library::library_ops;
use crate::term::Term;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Environment mapping names to terms
///
/// Holds every library operation as a [`Term::Function`] plus the constant
/// terms an encoded program refers to by name (`true`, `zero`, `nil`, ...).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    bindings: HashMap<String, Term>,
}

impl Environment {
    /// Empty environment, without the library
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Term) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    /// Like [`Environment::get`], but an unknown name is an error
    pub fn lookup(&self, name: &str) -> Result<&Term, Error> {
        self.get(name)
            .ok_or_else(|| Error::UnboundOperation(name.to_owned()))
    }

    /// Look up a function by name and apply it to `args`
    pub fn call(&self, name: &str, args: Vec<Term>) -> Result<Term, Error> {
        apply(self.lookup(name)?, args)
    }

    /// Register a strongly-typed Rust function as a named operation, using
    /// automatic argument extraction and result conversion.
    ///
    /// ```
    /// use derangements::env::create_term_env;
    /// use derangements::term::Term;
    ///
    /// let mut env = create_term_env();
    /// env.register_operation::<(i64, i64), _>("add", |a: i64, b: i64| a + b);
    /// let sum = env.call("add", vec![Term::Host(2), Term::Host(3)]).unwrap();
    /// assert_eq!(sum, Term::Host(5));
    /// ```
    ///
    /// Supported parameter types:
    /// - `Term` (owned access to the raw term)
    /// - `bool` (decoded boolean)
    /// - `u64` (decoded natural)
    /// - `std::cmp::Ordering` (decoded ordering)
    /// - `i64` (host integer)
    ///
    /// Supported return types:
    /// - any type `R` where `R: Into<Term>` (for example `Term`, `bool`,
    ///   `Ordering`, `i64`)
    /// - `Result<R, Error>` where `R: Into<Term>`
    ///
    /// Arity is enforced automatically and conversion failures yield
    /// `TypeError`.
    pub fn register_operation<Args, F>(&mut self, name: &str, func: F)
    where
        F: IntoOperation<Args>,
    {
        self.define(name, Term::operation(name, func));
    }

    /// Get all bindings, sorted by name
    pub fn get_all_bindings(&self) -> Vec<(String, Term)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

/// Apply a function term to arguments
pub fn apply(function: &Term, args: Vec<Term>) -> Result<Term, Error> {
    match function {
        Term::Function { func, .. } => func(args),
        other => Err(Error::TypeError(format!(
            "Cannot apply non-function: {other}"
        ))),
    }
}

/// Create an environment holding the full library and its constants
pub fn create_term_env() -> Environment {
    let mut env = Environment::new();

    for op in library_ops() {
        env.define(op.name, op.to_term());
    }

    env.define("true", Term::Bool(true));
    env.define("false", Term::Bool(false));
    env.define("zero", Term::Zero);
    env.define("nil", Term::Nil);
    env.define("lt", Term::Ord(Ordering::Less));
    env.define("eq", Term::Ord(Ordering::Equal));
    env.define("gt", Term::Ord(Ordering::Greater));

    env
}
