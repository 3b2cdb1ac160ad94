//! Internal helper macros

// Declares a fieldless enum whose discriminants are hardware codes, along
// with its `InvalidValue` error and the conversions to and from `u8`.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value, )+
        }

        #[doc = concat!("Error type for invalid [`", stringify!($name), "`] codes")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $error {
            /// The value does not correspond to a known code
            InvalidValue(u8),
        }

        impl TryFrom<u8> for $name {
            type Error = $error;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    invalid => Err($error::InvalidValue(invalid)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl From<$error> for $crate::error::RadioError {
            fn from(_: $error) -> Self {
                $crate::error::RadioError::InvalidParams
            }
        }
    };
}
