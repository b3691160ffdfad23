/// Optional media: the character image and the four audio clips.
///
/// Every file is independently optional. A missing or unreadable file is
/// logged and replaced by the placeholder sprite or a silent channel.

use std::path::Path;
use std::sync::Arc;

use crate::config::PathsConfig;
use super::sprite::Sprite;

/// Raw clip bytes, decoded by the sound engine at play time.
#[derive(Clone, Default)]
pub struct SoundClips {
    pub jump: Option<Arc<Vec<u8>>>,
    pub victory: Option<Arc<Vec<u8>>>,
    pub game_over: Option<Arc<Vec<u8>>>,
    pub ambient: Option<Arc<Vec<u8>>>,
}

pub struct Assets {
    pub sprite: Sprite,
    pub clips: SoundClips,
}

pub fn load(paths: &PathsConfig) -> Assets {
    let dir = &paths.assets_dir;

    let sprite = match read_optional(&dir.join(&paths.sprite)) {
        Some(bytes) => match Sprite::from_png_bytes(&bytes) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("character image unusable ({e}); using placeholder");
                Sprite::placeholder()
            }
        },
        None => Sprite::placeholder(),
    };

    let clip = |name: &str| read_optional(&dir.join(name)).map(Arc::new);
    let clips = SoundClips {
        jump: clip(&paths.jump_clip),
        victory: clip(&paths.victory_clip),
        game_over: clip(&paths.game_over_clip),
        ambient: clip(&paths.ambient_clip),
    };

    Assets { sprite, clips }
}

fn read_optional(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!("loaded {} ({} bytes)", path.display(), bytes.len());
            Some(bytes)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("asset not found: {}", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("could not read {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use std::path::PathBuf;

    #[test]
    fn missing_assets_fall_back() {
        let mut paths = GameConfig::parse_str("").unwrap().paths;
        paths.assets_dir = PathBuf::from("/nonexistent/cloudclimb-assets");
        let assets = load(&paths);
        assert!(assets.clips.jump.is_none());
        assert!(assets.clips.ambient.is_none());
        assert_eq!(
            assets.sprite.sample(0.0, 0.0, false),
            Sprite::placeholder().sample(0.0, 0.0, false)
        );
    }
}
