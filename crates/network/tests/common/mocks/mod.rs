//! Test doubles standing in for production components.
