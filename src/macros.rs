macro_rules! impl_compose(
    ($type:ident) => {
        impl Shr for $type {
            type Output = Result<$type, Error>;
            fn shr(self, other: $type) -> Self::Output {
                self.compose(&other)
            }
        }
        impl Shr<&$type> for $type {
            type Output = Result<$type, Error>;
            fn shr(self, other: &$type) -> Self::Output {
                self.compose(other)
            }
        }
        impl Shr<$type> for &$type {
            type Output = Result<$type, Error>;
            fn shr(self, other: $type) -> Self::Output {
                self.compose(&other)
            }
        }
        impl Shr<&$type> for &$type {
            type Output = Result<$type, Error>;
            fn shr(self, other: &$type) -> Self::Output {
                self.compose(other)
            }
        }
    };
);

pub(crate) use impl_compose;
