// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::io::stderr;

use crossterm::{style::Stylize, tty::IsTty};

macro_rules! impl_method {
    ($method:ident) => {
        fn $method(self) -> <Self as Stylize>::Styled {
            if stderr().is_tty() {
                <Self as Stylize>::$method(self)
            } else {
                self.stylize()
            }
        }
    };
}

/// Wrapper around `Stylize` which does nothing unless stderr is a TTY
///
/// Diagnostics go to stderr, so that is the stream checked, keeping
/// `-g` output on stdout free of escape codes.
pub trait Styled: Stylize {
    impl_method!(dim);
    impl_method!(red);
    impl_method!(yellow);
}

impl<T> Styled for T where T: Stylize {}
