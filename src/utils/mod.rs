use std::path::PathBuf;

use crate::process::System;

/// External tools and what needs them
const TOOLS: &[(&str, &str)] = &[
    ("yt-dlp", "required for audio download"),
    ("ffmpeg", "required by yt-dlp to extract audio"),
    ("whisper-cli", "required for the whisper-cpp backend"),
];

/// Check if the current environment has the external tools
pub fn check_dependencies(system: &dyn System) -> Vec<String> {
    TOOLS
        .iter()
        .filter(|(name, _)| system.lookup(name).is_none())
        .map(|(name, purpose)| format!("{} - {}", name, purpose))
        .collect()
}

/// Directory downloaded audio goes to when none is configured
pub fn default_output_dir() -> PathBuf {
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockSystem;

    #[test]
    fn test_check_dependencies_reports_missing_tools() {
        let mut system = MockSystem::new();
        system.expect_lookup().returning(|name| {
            if name == "whisper-cli" {
                None
            } else {
                Some(PathBuf::from("/usr/bin").join(name))
            }
        });

        let missing = check_dependencies(&system);
        assert_eq!(
            missing,
            vec!["whisper-cli - required for the whisper-cpp backend".to_string()]
        );
    }

    #[test]
    fn test_check_dependencies_all_present() {
        let mut system = MockSystem::new();
        system
            .expect_lookup()
            .returning(|name| Some(PathBuf::from("/usr/bin").join(name)));

        assert!(check_dependencies(&system).is_empty());
    }
}
