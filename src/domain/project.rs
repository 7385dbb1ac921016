//! Project configuration (`platformio.ini`) generation
//!
//! Only `[env:<name>]` section headers are interpreted; everything else in an
//! existing configuration is preserved verbatim.

use crate::domain::Board;
use serde::Serialize;

/// File name of the project configuration
pub const PROJECT_CONF_NAME: &str = "platformio.ini";

const CONF_HEADER: &str = "; Project Configuration File\n\
;\n\
;   Build options: build flags, source filter, extra scripting\n\
;   Upload options: custom port, speed and extra flags\n\
;   Library options: dependencies, extra library storages\n\
;\n";

/// One build environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEnv {
    /// Environment name, the board id for generated environments
    pub name: String,
    pub platform: String,
    pub board: String,
    pub framework: Option<String>,
}

impl ProjectEnv {
    /// Environment pre-generated from board settings
    pub fn from_board(board: &Board) -> Self {
        Self {
            name: board.id.clone(),
            platform: board.platform.clone(),
            board: board.id.clone(),
            framework: board.default_framework().map(String::from),
        }
    }

    fn render(&self) -> String {
        let mut out = format!(
            "[env:{}]\nplatform = {}\nboard = {}\n",
            self.name, self.platform, self.board
        );
        if let Some(framework) = &self.framework {
            out.push_str(&format!("framework = {}\n", framework));
        }
        out
    }
}

/// Project configuration document
#[derive(Debug, Clone, Default)]
pub struct ProjectConf {
    content: String,
}

impl ProjectConf {
    /// Start a new, empty configuration with the standard header
    pub fn new() -> Self {
        Self {
            content: CONF_HEADER.to_string(),
        }
    }

    /// Wrap an existing configuration
    pub fn parse(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// Names of all `[env:<name>]` sections
    pub fn env_names(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let inner = line.strip_prefix('[')?.strip_suffix(']')?;
                inner.trim().strip_prefix("env:").map(|n| n.trim().to_string())
            })
            .collect()
    }

    /// Whether an environment with this name exists
    pub fn has_env(&self, name: &str) -> bool {
        self.env_names().iter().any(|n| n == name)
    }

    /// Append an environment unless one with the same name exists
    ///
    /// Returns `true` when the environment was added.
    pub fn add_env(&mut self, env: &ProjectEnv) -> bool {
        if self.has_env(&env.name) {
            return false;
        }
        if !self.content.is_empty() && !self.content.ends_with("\n\n") {
            if !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push('\n');
        }
        self.content.push_str(&env.render());
        true
    }

    /// Rendered configuration text
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uno() -> Board {
        Board::new("uno", "Arduino Uno", "atmelavr").with_frameworks(["arduino"])
    }

    #[test]
    fn test_env_from_board() {
        let env = ProjectEnv::from_board(&uno());
        assert_eq!(env.name, "uno");
        assert_eq!(env.platform, "atmelavr");
        assert_eq!(env.framework.as_deref(), Some("arduino"));
    }

    #[test]
    fn test_new_conf_with_envs() {
        let mut conf = ProjectConf::new();
        assert!(conf.add_env(&ProjectEnv::from_board(&uno())));
        assert!(conf.add_env(&ProjectEnv::from_board(&Board::new(
            "native",
            "Native",
            "native"
        ))));

        let text = conf.as_str();
        assert!(text.starts_with("; Project Configuration File"));
        assert!(text.contains("[env:uno]\nplatform = atmelavr\nboard = uno\nframework = arduino\n"));
        assert!(text.contains("\n\n[env:native]\nplatform = native\nboard = native\n"));
        assert!(!text.contains("[env:native]\nplatform = native\nboard = native\nframework"));
        assert_eq!(conf.env_names(), vec!["uno", "native"]);
    }

    #[test]
    fn test_existing_env_not_duplicated() {
        let mut conf = ProjectConf::parse("[env:uno]\nplatform = atmelavr\nboard = uno\nbuild_flags = -DFOO");
        assert!(!conf.add_env(&ProjectEnv::from_board(&uno())));
        assert_eq!(conf.env_names(), vec!["uno"]);
        assert!(conf.as_str().contains("build_flags = -DFOO"));
    }

    #[test]
    fn test_append_to_existing_conf() {
        let mut conf = ProjectConf::parse("[platformio]\nsrc_dir = src\n\n[ env:due ]\nplatform = atmelsam");
        assert!(conf.has_env("due"));
        assert!(conf.add_env(&ProjectEnv::from_board(&uno())));
        assert!(conf.as_str().contains("platform = atmelsam\n\n[env:uno]"));
    }
}
