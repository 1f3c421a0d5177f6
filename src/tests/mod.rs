//! Integration tests for LiveProbe.
//!
//! These tests boot the whole application and talk to its probe endpoints over HTTP.


pub mod support;
