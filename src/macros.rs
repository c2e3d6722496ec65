// Thin wrappers so call sites don't need `cfg` attributes when `log` is off.
// The disabled variants still type-check their arguments.

#[cfg(feature = "log")]
macro_rules! trace {
    ($($arg:tt)+) => {
        ::log::trace!($($arg)+)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($arg:tt)+) => {{
        if false {
            let _ = ::std::format!($($arg)+);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! debug {
    ($($arg:tt)+) => {
        ::log::debug!($($arg)+)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($arg:tt)+) => {{
        if false {
            let _ = ::std::format!($($arg)+);
        }
    }};
}

#[cfg(feature = "log")]
macro_rules! warn {
    ($($arg:tt)+) => {
        ::log::warn!($($arg)+)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! warn {
    ($($arg:tt)+) => {{
        if false {
            let _ = ::std::format!($($arg)+);
        }
    }};
}
