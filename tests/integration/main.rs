//! Integration tests for the Courtside connection layer, driven against
//! an in-process stub backend.

mod helpers;

mod credentials_test;
mod ws_test;
