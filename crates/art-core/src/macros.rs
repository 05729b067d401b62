// SPDX-License-Identifier: MIT

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`] — `Display` impl mapping enum variants to string literals
//! - [`setters!`] — fluent setter methods for config/builder structs
//!
//! No `builder!`: every config/options struct in this crate family
//! (`StartOpts`, `InstanceConfig`, fixture actions in the `*_tests.rs`
//! files) already has one real production constructor that `setters!`
//! decorates, so a second, test-only struct generated purely to build
//! the first would just be another way to construct the same type.

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Generate fluent setter methods inside an existing `impl` block.
///
/// - `into { field: Type }` — setter takes `impl Into<Type>`
/// - `set { field: Type }` — setter takes `Type` directly
/// - `option { field: Type }` — field is `Option<Type>`, setter wraps in `Some`
#[macro_export]
macro_rules! setters {
    () => {};

    (
        into {
            $( $into_field:ident : $into_ty:ty ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        $(
            pub fn $into_field(mut self, v: impl Into<$into_ty>) -> Self {
                self.$into_field = v.into();
                self
            }
        )*

        $crate::setters! { $($rest)* }
    };

    (
        set {
            $( $set_field:ident : $set_ty:ty ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        $(
            pub fn $set_field(mut self, v: $set_ty) -> Self {
                self.$set_field = v;
                self
            }
        )*

        $crate::setters! { $($rest)* }
    };

    (
        option {
            $( $opt_field:ident : $opt_ty:ty ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        $(
            pub fn $opt_field(mut self, v: impl Into<$opt_ty>) -> Self {
                self.$opt_field = Some(v.into());
                self
            }
        )*

        $crate::setters! { $($rest)* }
    };
}
