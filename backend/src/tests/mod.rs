mod common;
mod router_test;

pub(crate) use common::*;
