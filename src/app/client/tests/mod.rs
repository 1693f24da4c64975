//! Tests for the TheMealDB client
//!
//! `mock_server` drives the client against a local `wiremock` server.
//! `live_api` talks to the real service and is ignored by default.
