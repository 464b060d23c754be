use crate::Error;
use crate::term::Term;
use std::cmp::Ordering;
use std::sync::Arc;

/// Canonical erased function type stored in [`Term::Function`].
///
/// Operations receive ownership of their argument vector, enabling
/// implementations that consume or rearrange arguments without cloning.
pub type OperationFn = dyn Fn(Vec<Term>) -> Result<Term, Error> + Send + Sync;

// =====================================================================
// Argument conversion
//
// `FromParam` turns an owned `Term` argument into a strongly-typed Rust
// parameter. All supported parameter types are listed here so they are
// easy to audit.
// =====================================================================

/// Conversion from a single term argument into a typed parameter.
pub trait FromParam: Sized {
    fn from_arg(term: Term) -> Result<Self, Error>;
}

impl FromParam for Term {
    fn from_arg(term: Term) -> Result<Self, Error> {
        Ok(term)
    }
}

macro_rules! impl_from_param_via_try_from {
    ($($ty:ty),+) => {
        $(
            impl FromParam for $ty {
                fn from_arg(term: Term) -> Result<Self, Error> {
                    <$ty>::try_from(term)
                }
            }
        )+
    };
}

// bool: two-branch selector, u64: natural, Ordering: three-way result,
// i64: opaque host integer
impl_from_param_via_try_from!(bool, u64, Ordering, i64);

// =====================================================================
// Return-type adaptation
// =====================================================================

/// Normalizes function return types to the canonical `Result<Term, Error>`.
///
/// Functions typically return either `Result<Term, Error>` directly,
/// `Result<T, Error>` for some `T: Into<Term>`, or a bare `T: Into<Term>`.
pub trait IntoTermResult {
    fn into_term_result(self) -> Result<Term, Error>;
}

impl<T> IntoTermResult for Result<T, Error>
where
    T: Into<Term>,
{
    fn into_term_result(self) -> Result<Term, Error> {
        self.map(Into::into)
    }
}

impl<T> IntoTermResult for T
where
    T: Into<Term>,
{
    fn into_term_result(self) -> Result<Term, Error> {
        Ok(self.into())
    }
}

/// Converts strongly-typed Rust functions or closures into the erased
/// [`OperationFn`], parameterized by an argument tuple type.
pub trait IntoOperation<Args> {
    fn into_operation(self) -> Arc<OperationFn>;
}

// =====================================================================
// Fixed-arity adapters
// =====================================================================

/// Implements `IntoOperation` for functions of a given arity.
///
/// The owned argument vector is checked against the arity up front and then
/// moved into an array so each slot is converted by value.
macro_rules! impl_into_operation_for_arity {
    ($arity:expr, $( $p:ident : $A:ident ),+ ) => {
        impl<F, R, $( $A ),+> IntoOperation<( $( $A, )+ )> for F
        where
            F: Fn( $( $A ),+ ) -> R + Send + Sync + 'static,
            $( $A: FromParam, )+
            R: IntoTermResult,
        {
            fn into_operation(self) -> Arc<OperationFn> {
                Arc::new(move |args: Vec<Term>| {
                    let len = args.len();
                    let [ $( $p ),+ ] = <[Term; $arity]>::try_from(args)
                        .map_err(|_| Error::arity_error($arity, len))?;
                    $(
                        let $p = <$A as FromParam>::from_arg($p)?;
                    )+
                    (self)( $( $p ),+ ).into_term_result()
                })
            }
        }
    };
}

// 0-arg functions / closures
impl<F, R> IntoOperation<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: IntoTermResult,
{
    fn into_operation(self) -> Arc<OperationFn> {
        Arc::new(move |args: Vec<Term>| {
            if !args.is_empty() {
                return Err(Error::arity_error(0, args.len()));
            }
            (self)().into_term_result()
        })
    }
}

impl_into_operation_for_arity!(1, p0: A1);
impl_into_operation_for_arity!(2, p0: A1, p1: A2);
impl_into_operation_for_arity!(3, p0: A1, p1: A2, p2: A3);
impl_into_operation_for_arity!(4, p0: A1, p1: A2, p2: A3, p3: A4);

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::term::succ;

    fn op<Args, F: IntoOperation<Args>>(f: F) -> Arc<OperationFn> {
        f.into_operation()
    }

    #[test]
    fn test_typed_parameters_are_decoded() {
        let not = op::<(bool,), _>(|b: bool| !b);
        assert_eq!(not(vec![Term::Bool(true)]).unwrap(), Term::Bool(false));

        let bigger = op::<(u64, u64), _>(|a: u64, b: u64| a > b);
        assert_eq!(
            bigger(vec![succ(succ(Term::Zero)), succ(Term::Zero)]).unwrap(),
            Term::Bool(true)
        );

        let add = op::<(i64, i64), _>(|a: i64, b: i64| a + b);
        assert_eq!(
            add(vec![Term::Host(40), Term::Host(2)]).unwrap(),
            Term::Host(42)
        );
    }

    #[test]
    fn test_result_returns_are_propagated() {
        let fails = op::<(Term,), _>(|_: Term| -> Result<Term, Error> {
            Err(Error::InvalidInput("nope".into()))
        });
        assert_eq!(
            fails(vec![Term::Nil]),
            Err(Error::InvalidInput("nope".into()))
        );
    }

    #[test]
    fn test_arity_and_type_errors() {
        let not = op::<(bool,), _>(|b: bool| !b);
        assert_eq!(not(vec![]), Err(Error::arity_error(1, 0)));
        assert_eq!(
            not(vec![Term::Bool(true), Term::Bool(true)]),
            Err(Error::arity_error(1, 2))
        );
        assert!(matches!(not(vec![Term::Zero]), Err(Error::TypeError(_))));

        let constant = op::<(), _>(|| true);
        assert_eq!(constant(vec![]).unwrap(), Term::Bool(true));
        assert_eq!(constant(vec![Term::Nil]), Err(Error::arity_error(0, 1)));
    }
}
