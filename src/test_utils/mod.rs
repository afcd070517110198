#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{create_group, get_test_server_and_state, record_spend, sign_up};
