/// Constructs a [`crate::Error::InvalidData`] for the given format string.
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { $crate::Error::InvalidData(format!($($args)*)).into() };
}

/// Constructs a [`crate::Error::InvalidInput`] for the given format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::Error::InvalidInput(format!($($args)*)).into() };
}

/// Constructs a [`crate::Error::InvalidOperation`] for the given format string.
#[macro_export]
macro_rules! errop {
    ($($args:tt)*) => { $crate::Error::InvalidOperation(format!($($args)*)).into() };
}
