// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::audio::decode::Decoder;
use crate::bank::{self, SoundBank};
use crate::dispatcher::KeyDispatcher;
use crate::error::Error;
use crate::volume::Volume;

pub mod audio;

pub use self::audio::Audio;

const DEFAULT_SOUNDS_ROOT: &str = "sounds";
const DEFAULT_EXTENSIONS: [&str; 2] = ["mp3", "wav"];
const DEFAULT_PRIMARY_OVERRIDE: &str = "spacebar";
const DEFAULT_SECONDARY_OVERRIDE: &str = "non_default";
const DEFAULT_PRIMARY_KEY: &str = "Space";
const ENV_PREFIX: &str = "KEYCLACK";

/// The keyclack configuration. Every field is optional; unset fields fall back to
/// the defaults above.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    /// The directory holding one subdirectory per sound set.
    sounds_root: Option<PathBuf>,

    /// File extensions (without the dot) that are loaded into the sound bank.
    extensions: Option<Vec<String>>,

    /// Logical name of the clip played for the primary key.
    primary_override: Option<String>,

    /// Logical name of the clip played for every other key.
    secondary_override: Option<String>,

    /// Name of the key that triggers the primary override.
    primary_key: Option<String>,

    /// Audio output settings.
    audio: Audio,
}

impl Config {
    /// Loads the configuration from the optional YAML file, then from
    /// KEYCLACK_* environment variables (nested keys separated by "__", extensions
    /// separated by ",").
    pub fn load(path: Option<&Path>) -> Result<Config, Error> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            info!(path = ?path, "Loading config");
            builder = builder.add_source(::config::File::from(path));
        }

        Ok(builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("extensions"),
            )
            .build()?
            .try_deserialize::<Config>()?)
    }

    /// Overrides the sounds root directory.
    pub fn with_sounds_root(mut self, sounds_root: PathBuf) -> Config {
        self.sounds_root = Some(sounds_root);
        self
    }

    /// Overrides the audio device.
    pub fn with_device(mut self, device: &str) -> Config {
        self.audio.set_device(device);
        self
    }

    /// Returns the sounds root directory.
    pub fn sounds_root(&self) -> &Path {
        self.sounds_root
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_SOUNDS_ROOT))
    }

    /// Returns the directory of the given sound set.
    pub fn sound_set_dir(&self, sound_set: &str) -> PathBuf {
        self.sounds_root().join(sound_set)
    }

    /// Returns the recognized audio extensions.
    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(extensions) => extensions.clone(),
            None => DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    pub fn primary_override(&self) -> &str {
        self.primary_override
            .as_deref()
            .unwrap_or(DEFAULT_PRIMARY_OVERRIDE)
    }

    pub fn secondary_override(&self) -> &str {
        self.secondary_override
            .as_deref()
            .unwrap_or(DEFAULT_SECONDARY_OVERRIDE)
    }

    pub fn primary_key(&self) -> &str {
        self.primary_key.as_deref().unwrap_or(DEFAULT_PRIMARY_KEY)
    }

    /// Filename prefixes that are kept out of the per-key selection pool.
    pub fn reserved_prefixes(&self) -> Vec<&str> {
        vec![self.primary_override(), self.secondary_override()]
    }

    /// Returns the audio configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }
}

/// Verifies the sound set exists, opens the audio device, loads every clip and returns
/// a dispatcher ready to receive key events. A missing sound set is reported before the
/// audio device is touched.
pub fn init_dispatcher(
    config: &Config,
    sound_set: &str,
    volume: Volume,
) -> Result<KeyDispatcher, Error> {
    let dir = config.sound_set_dir(sound_set);
    if !dir.is_dir() {
        let available = bank::available_sets(config.sounds_root());
        if !available.is_empty() {
            info!(available = available.join(", "), "Available sound sets");
        }
        return Err(Error::SoundSetNotFound {
            name: sound_set.to_string(),
            root: config.sounds_root().to_path_buf(),
        });
    }

    let device =
        crate::audio::get_device(config.audio()).map_err(|e| Error::Audio(e.to_string()))?;
    info!(device = device.to_string(), "Using audio device");

    let decoder = Decoder::new(device.sample_rate());
    let bank = SoundBank::load(&dir, volume.scalar(), &config.extensions(), &decoder)?;
    info!(
        sound_set,
        volume = volume.to_string(),
        clips = bank.len(),
        "Loaded sound set"
    );

    KeyDispatcher::new(bank, config, device)
}

#[cfg(test)]
mod test {
    use std::env;
    use std::fs;

    use config::{Config as Sources, File, FileFormat};

    use super::*;
    use crate::testutil;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(Path::new("sounds"), config.sounds_root());
        assert_eq!(Path::new("sounds/cherry"), config.sound_set_dir("cherry"));
        assert_eq!(vec!["mp3", "wav"], config.extensions());
        assert_eq!("spacebar", config.primary_override());
        assert_eq!("non_default", config.secondary_override());
        assert_eq!("Space", config.primary_key());
        assert_eq!(vec!["spacebar", "non_default"], config.reserved_prefixes());
    }

    #[test]
    fn test_deserialize() {
        let yaml = r#"
            sounds_root: /opt/keyclack/sounds
            extensions:
              - ogg
            primary_override: space_clip
            secondary_override: all_keys
            primary_key: Return
            audio:
              device: mock-device
              max_voices: 4
        "#;

        let config: Config = Sources::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(Path::new("/opt/keyclack/sounds"), config.sounds_root());
        assert_eq!(vec!["ogg"], config.extensions());
        assert_eq!(vec!["space_clip", "all_keys"], config.reserved_prefixes());
        assert_eq!("Return", config.primary_key());
        assert_eq!(Some("mock-device"), config.audio().device());
        assert_eq!(4, config.audio().max_voices());
    }

    #[test]
    fn test_load_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keyclack.yaml");
        fs::write(&path, "primary_key: Tab\n")?;

        let config = Config::load(Some(&path))?;
        assert_eq!("Tab", config.primary_key());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/keyclack.yaml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_sounds_root(PathBuf::from("elsewhere"))
            .with_device("mock-override");
        assert_eq!(Path::new("elsewhere"), config.sounds_root());
        assert_eq!(Some("mock-override"), config.audio().device());
    }

    #[test]
    fn test_init_dispatcher_missing_set() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("cherry"))?;
        let config = Config::default()
            .with_sounds_root(root.path().to_path_buf())
            .with_device("mock");

        match init_dispatcher(&config, "topre", Volume::default()) {
            Err(Error::SoundSetNotFound { name, root: reported }) => {
                assert_eq!("topre", name);
                assert_eq!(root.path(), reported.as_path());
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected missing sound set"),
        }
        Ok(())
    }

    #[test]
    fn test_init_dispatcher() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempfile::tempdir()?;
        let set = root.path().join("cherry");
        fs::create_dir(&set)?;
        testutil::write_click(set.join("a.wav"), 44100)?;
        testutil::write_click(set.join("spacebar.wav"), 44100)?;
        fs::write(set.join("notes.txt"), "not audio")?;

        let config = Config::default()
            .with_sounds_root(root.path().to_path_buf())
            .with_device("mock");
        let dispatcher = init_dispatcher(&config, "cherry", Volume::from_percent(40))?;

        assert_eq!(1, dispatcher.pool_size());
        Ok(())
    }

    #[test]
    fn test_env_override() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("KEYCLACK_SECONDARY_OVERRIDE", "every_key");
        let config = Config::load(None);
        env::remove_var("KEYCLACK_SECONDARY_OVERRIDE");

        assert_eq!("every_key", config?.secondary_override());
        Ok(())
    }

    #[test]
    fn test_env_extensions_list() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("KEYCLACK_EXTENSIONS", "mp3,ogg");
        let config = Config::load(None);
        env::remove_var("KEYCLACK_EXTENSIONS");

        assert_eq!(vec!["mp3", "ogg"], config?.extensions());
        Ok(())
    }
}
