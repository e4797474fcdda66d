#![allow(dead_code)]

pub mod messages_server;
pub mod scripted_backend;
