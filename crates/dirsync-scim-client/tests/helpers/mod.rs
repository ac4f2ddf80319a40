#![allow(dead_code)]

pub mod mock_scim_server;
