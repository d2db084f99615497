//! Argument packing - native values into host Variables
//!
//! Design: one conversion primitive per supported native type, one packing
//! pass per call. Arity and per-slot types must match the target script
//! function's declaration; that contract belongs to the caller and is never
//! checked here.

use crate::host::{FixedString, ObjectHandle, ScrapArray, Variable};

/// Conversion primitive from one native value into one host Variable.
pub trait IntoVariable {
    fn into_variable(self) -> Variable;
}

impl IntoVariable for Variable {
    #[inline]
    fn into_variable(self) -> Variable {
        self
    }
}

impl IntoVariable for () {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::none()
    }
}

impl IntoVariable for bool {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::boolean(self)
    }
}

impl IntoVariable for i32 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(self)
    }
}

// The host's integer slot is 32-bit signed; narrower types widen, u32 keeps
// its bit pattern.
impl IntoVariable for i8 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(i32::from(self))
    }
}

impl IntoVariable for i16 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(i32::from(self))
    }
}

impl IntoVariable for u8 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(i32::from(self))
    }
}

impl IntoVariable for u16 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(i32::from(self))
    }
}

impl IntoVariable for u32 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::int(self as i32)
    }
}

impl IntoVariable for f32 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::float(self)
    }
}

// The host's float slot is single precision.
impl IntoVariable for f64 {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::float(self as f32)
    }
}

impl IntoVariable for FixedString {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::string(self)
    }
}

impl IntoVariable for &str {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::string(FixedString::new(self))
    }
}

impl IntoVariable for String {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::string(FixedString::new(&self))
    }
}

impl IntoVariable for ObjectHandle {
    #[inline]
    fn into_variable(self) -> Variable {
        Variable::object(self)
    }
}

impl<T: IntoVariable> IntoVariable for Option<T> {
    #[inline]
    fn into_variable(self) -> Variable {
        match self {
            Some(value) => value.into_variable(),
            None => Variable::none(),
        }
    }
}

/// A fixed-arity native argument list, packed left to right.
pub trait ArgList {
    /// Declared arity of the list.
    const ARITY: usize;

    /// Append every argument to `out` in declaration order.
    fn pack_into(self, out: &mut ScrapArray);
}

impl ArgList for () {
    const ARITY: usize = 0;

    #[inline]
    fn pack_into(self, _out: &mut ScrapArray) {}
}

macro_rules! impl_arg_list {
    ($arity:expr => $($name:ident),+) => {
        impl<$($name: IntoVariable),+> ArgList for ($($name,)+) {
            const ARITY: usize = $arity;

            #[allow(non_snake_case)]
            #[inline]
            fn pack_into(self, out: &mut ScrapArray) {
                let ($($name,)+) = self;
                $(out.push($name.into_variable());)+
            }
        }
    };
}

impl_arg_list!(1 => A);
impl_arg_list!(2 => A, B);
impl_arg_list!(3 => A, B, C);
impl_arg_list!(4 => A, B, C, D);
impl_arg_list!(5 => A, B, C, D, E);
impl_arg_list!(6 => A, B, C, D, E, F);
impl_arg_list!(7 => A, B, C, D, E, F, G);
impl_arg_list!(8 => A, B, C, D, E, F, G, H);

/// Pack an argument list into a fresh sequence.
pub fn pack_args<A: ArgList>(args: A) -> ScrapArray {
    let mut out = ScrapArray::with_capacity(A::ARITY);
    args.pack_into(&mut out);
    out
}
