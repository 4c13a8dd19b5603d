/// Assert that two values convertible to [`decimal_wad::decimal::Decimal`] (e.g. [`crate::Price`])
/// are within `epsilon` of each other.
#[macro_export]
macro_rules! assert_fuzzy_price_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {
        $crate::assert_fuzzy_price_eq!($actual, $expected, $epsilon, "")
    };
    ($actual:expr, $expected:expr, $epsilon:expr, $($t:tt)*) => {{
        let eps: $crate::utils::decimal_wad::decimal::Decimal = $epsilon.into();
        let act: $crate::utils::decimal_wad::decimal::Decimal = $actual.into();
        let exp: $crate::utils::decimal_wad::decimal::Decimal = $expected.into();
        let diff = if act > exp { act - exp } else { exp - act };
        if diff > eps {
            let msg = format!($($t)*);
            panic!(
                "{} Actual {} Expected {} diff {} Epsilon {}",
                msg, act, exp, diff, eps
            );
        }
    }};
}
