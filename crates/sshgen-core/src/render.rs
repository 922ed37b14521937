//! SSH client config rendering

use std::fmt::Write;

use crate::asset::Asset;

/// First line of every generated file
#[must_use]
pub fn banner(tool_name: &str) -> String {
    format!("# This file is managed by script:{tool_name}. Do not edit.\n")
}

/// Renders assets into `ssh_config(5)` host stanzas
#[derive(Debug, Clone)]
pub struct Renderer {
    tool_name: String,
    default_user: String,
}

impl Renderer {
    /// `default_user` applies to assets without a username override
    pub fn new(tool_name: impl Into<String>, default_user: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            default_user: default_user.into(),
        }
    }

    /// Full file contents: banner, blank line, then one stanza per asset
    /// in iteration order, each followed by a blank line
    #[must_use]
    pub fn render<'a>(&self, assets: impl IntoIterator<Item = &'a Asset>) -> String {
        let mut out = banner(&self.tool_name);
        out.push('\n');
        for asset in assets {
            self.write_stanza(&mut out, asset);
        }
        out
    }

    /// One stanza including its trailing blank line
    #[must_use]
    pub fn stanza(&self, asset: &Asset) -> String {
        let mut out = String::new();
        self.write_stanza(&mut out, asset);
        out
    }

    fn write_stanza(&self, out: &mut String, asset: &Asset) {
        // writing to a String cannot fail
        let _ = write!(
            out,
            "host {}\n    hostname {}\n    user {}\n    port {}\n\n",
            asset.alias,
            asset.address,
            asset.user(&self.default_user),
            asset.port(),
        );
    }
}
