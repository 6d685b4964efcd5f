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
//! The sound bank: every clip of one sound set, decoded into memory at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::Clip;
use crate::error::Error;

/// Extensions tried, in order, when looking up a clip by its logical name.
const NAMED_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Turns a file on disk into a playable clip.
pub trait ClipLoader {
    fn load(&self, path: &Path, volume: f32) -> Result<Clip, Error>;
}

/// An immutable mapping from filename (including extension) to clip. Entries are kept
/// sorted by filename so that iteration order never depends on the filesystem.
pub struct SoundBank {
    dir: PathBuf,
    clips: BTreeMap<String, Clip>,
}

impl SoundBank {
    /// Loads every file directly inside `dir` whose name ends in one of `extensions`.
    /// Subdirectories are not descended into. Any file that fails to load fails the
    /// whole bank.
    pub fn load(
        dir: &Path,
        volume: f32,
        extensions: &[String],
        loader: &dyn ClipLoader,
    ) -> Result<SoundBank, Error> {
        if !dir.is_dir() {
            return Err(Error::SoundSetNotFound {
                name: dir
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default(),
                root: dir.parent().map(Path::to_path_buf).unwrap_or_default(),
            });
        }

        let mut clips = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                warn!(path = ?path, "Skipping file with a non UTF-8 name");
                continue;
            };
            if !is_audio_file(filename, extensions) {
                debug!(path = ?path, "Skipping non-audio file");
                continue;
            }

            let clip = loader.load(&path, volume)?;
            debug!(clip = ?clip, "Clip loaded");
            clips.insert(filename.to_string(), clip);
        }

        let bank = SoundBank {
            dir: dir.to_path_buf(),
            clips,
        };
        info!(
            dir = ?dir,
            clips = bank.len(),
            memory_kb = bank.memory_size() / 1024,
            "Sound bank loaded"
        );
        Ok(bank)
    }

    /// Builds a bank from already decoded clips, keyed by clip name.
    pub fn from_clips(dir: &Path, clips: impl IntoIterator<Item = Clip>) -> SoundBank {
        SoundBank {
            dir: dir.to_path_buf(),
            clips: clips
                .into_iter()
                .map(|clip| (clip.name().to_string(), clip))
                .collect(),
        }
    }

    /// Returns `<logical_name>.mp3` if present, otherwise `<logical_name>.wav`.
    /// A missing clip is normal and means no override is configured.
    pub fn lookup_named(&self, logical_name: &str) -> Option<&Clip> {
        NAMED_EXTENSIONS
            .iter()
            .find_map(|ext| self.clips.get(&format!("{}.{}", logical_name, ext)))
    }

    /// Returns every clip whose filename does not start with one of the reserved
    /// prefixes, in filename order.
    pub fn pool(&self, reserved_prefixes: &[&str]) -> Vec<Clip> {
        self.clips
            .iter()
            .filter(|(name, _)| {
                !reserved_prefixes
                    .iter()
                    .any(|prefix| name.starts_with(prefix))
            })
            .map(|(_, clip)| clip.clone())
            .collect()
    }

    pub fn get(&self, filename: &str) -> Option<&Clip> {
        self.clips.get(filename)
    }

    /// Filenames in the bank, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.clips.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// The directory the bank was loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the total memory used by the decoded clips.
    pub fn memory_size(&self) -> usize {
        self.clips.values().map(Clip::memory_size).sum()
    }
}

/// True if `filename` ends in `.<ext>` for one of the given extensions.
pub fn is_audio_file(filename: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| {
        filename
            .strip_suffix(ext.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    })
}

/// Lists the sound set directories under the given root, sorted. Returns an empty list
/// if the root can't be read.
pub fn available_sets(root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    let mut sets: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    sets.sort();
    sets
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::*;
    use crate::testutil;

    /// Records which files were loaded without decoding them.
    struct FakeLoader {
        loaded: RefCell<Vec<String>>,
    }

    impl FakeLoader {
        fn new() -> FakeLoader {
            FakeLoader {
                loaded: RefCell::new(Vec::new()),
            }
        }
    }

    impl ClipLoader for FakeLoader {
        fn load(&self, path: &Path, volume: f32) -> Result<Clip, Error> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            self.loaded.borrow_mut().push(name.clone());
            Ok(testutil::clip(&name, volume))
        }
    }

    fn extensions() -> Vec<String> {
        vec!["mp3".to_string(), "wav".to_string()]
    }

    #[test]
    fn test_load_filters_extensions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for name in ["x.mp3", "y.txt", "z.wav"] {
            fs::write(dir.path().join(name), "")?;
        }
        fs::create_dir(dir.path().join("nested.wav"))?;
        fs::write(dir.path().join("nested.wav").join("deep.wav"), "")?;

        let loader = FakeLoader::new();
        let bank = SoundBank::load(dir.path(), 0.3, &extensions(), &loader)?;

        assert_eq!(vec!["x.mp3", "z.wav"], bank.names());
        assert_eq!(2, loader.loaded.borrow().len());
        assert_eq!(0.3, bank.get("x.mp3").unwrap().volume());
        assert_eq!(dir.path(), bank.dir());
        Ok(())
    }

    #[test]
    fn test_load_missing_dir() {
        let loader = FakeLoader::new();
        let result = SoundBank::load(
            Path::new("/nonexistent/sounds/cherry"),
            1.0,
            &extensions(),
            &loader,
        );

        match result {
            Err(Error::SoundSetNotFound { name, root }) => {
                assert_eq!("cherry", name);
                assert_eq!(Path::new("/nonexistent/sounds"), root.as_path());
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected missing sound set"),
        }
        assert!(loader.loaded.borrow().is_empty());
    }

    #[test]
    fn test_load_propagates_decode_errors() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("broken.wav"), "not a wav")?;

        let decoder = crate::audio::decode::Decoder::new(44100);
        let result = SoundBank::load(dir.path(), 1.0, &extensions(), &decoder);
        assert!(matches!(result, Err(Error::Decode { .. })));
        Ok(())
    }

    #[test]
    fn test_lookup_named_prefers_mp3() {
        let bank = SoundBank::from_clips(
            Path::new("cherry"),
            vec![
                testutil::clip("spacebar.wav", 1.0),
                testutil::clip("spacebar.mp3", 1.0),
                testutil::clip("non_default.wav", 1.0),
                testutil::clip("a.mp3", 1.0),
            ],
        );

        assert_eq!("spacebar.mp3", bank.lookup_named("spacebar").unwrap().name());
        assert_eq!(
            "non_default.wav",
            bank.lookup_named("non_default").unwrap().name()
        );
        assert!(bank.lookup_named("enter").is_none());
        assert!(bank.lookup_named("a.mp3").is_none());
    }

    #[test]
    fn test_pool_excludes_reserved() {
        let bank = SoundBank::from_clips(
            Path::new("cherry"),
            vec![
                testutil::clip("spacebar.mp3", 1.0),
                testutil::clip("spacebar_alt.wav", 1.0),
                testutil::clip("non_default.wav", 1.0),
                testutil::clip("b.mp3", 1.0),
                testutil::clip("a.mp3", 1.0),
            ],
        );

        let pool: Vec<String> = bank
            .pool(&["spacebar", "non_default"])
            .iter()
            .map(|clip| clip.name().to_string())
            .collect();
        assert_eq!(vec!["a.mp3", "b.mp3"], pool);
        assert_eq!(5, bank.pool(&[]).len());
    }

    #[test]
    fn test_is_audio_file() {
        let extensions = extensions();
        assert!(is_audio_file("a.mp3", &extensions));
        assert!(is_audio_file("spacebar.wav", &extensions));
        assert!(!is_audio_file("a.txt", &extensions));
        assert!(!is_audio_file("mp3", &extensions));
        assert!(!is_audio_file("notwav", &extensions));
        assert!(!is_audio_file("a.WAV", &extensions));
    }

    #[test]
    fn test_available_sets() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("topre"))?;
        fs::create_dir(root.path().join("cherry"))?;
        fs::write(root.path().join("readme.txt"), "")?;

        assert_eq!(vec!["cherry", "topre"], available_sets(root.path()));
        assert!(available_sets(Path::new("/nonexistent")).is_empty());
        Ok(())
    }
}
