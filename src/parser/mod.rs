//! Document parsing utilities for content-guardrails

pub mod frontmatter;
