//! Macro para declarar stages tipados sin boilerplate.
//!
//! Formas soportadas:
//! - `typed_stage!(pub Even = "num.even");` stage sin parámetros.
//! - `typed_stage!(pub Scale { factor: f64 } = "num.scale");`
//!
//! El crate que la usa debe depender de `serde` (derives).

#[macro_export]
macro_rules! typed_stage {
    // ---------------- Unit stage ----------------
    ($(#[$meta:meta])* $vis:vis $name:ident = $key:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        $vis struct $name;

        impl $crate::stage::TypedStage for $name {
            const KEY: &'static str = $key;
        }
    };

    // ---------------- Stage con params ----------------
    ($(#[$meta:meta])* $vis:vis $name:ident { $($(#[$fmeta:meta])* $fname:ident : $fty:ty),+ $(,)? } = $key:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        $vis struct $name { $($(#[$fmeta])* pub $fname: $fty,)+ }

        impl $crate::stage::TypedStage for $name {
            const KEY: &'static str = $key;
        }
    };
}
