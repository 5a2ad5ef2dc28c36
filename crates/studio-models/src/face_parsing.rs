//! Face parsing configuration for skin enhancement jobs.
//!
//! Each flag selects a face region the enhancement model should treat as
//! skin-adjacent and process. The field names are the wire names.

use serde::{Deserialize, Serialize};

/// Face regions to enhance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceParsingConfig {
    pub background: bool,
    pub skin: bool,
    pub nose: bool,
    pub eye_g: bool,
    pub r_eye: bool,
    pub l_eye: bool,
    pub r_brow: bool,
    pub l_brow: bool,
    pub r_ear: bool,
    pub l_ear: bool,
    pub mouth: bool,
    pub u_lip: bool,
    pub l_lip: bool,
    pub hair: bool,
    pub hat: bool,
    pub ear_r: bool,
    pub neck_l: bool,
    pub neck: bool,
    pub cloth: bool,
}

impl Default for FaceParsingConfig {
    fn default() -> Self {
        Self {
            background: false,
            skin: true,
            nose: true,
            eye_g: true,
            r_eye: true,
            l_eye: true,
            r_brow: true,
            l_brow: true,
            r_ear: false,
            l_ear: false,
            mouth: true,
            u_lip: true,
            l_lip: true,
            hair: true,
            hat: false,
            ear_r: false,
            neck_l: false,
            neck: false,
            cloth: false,
        }
    }
}

impl FaceParsingConfig {
    /// Wire names of all enabled regions, in declaration order.
    pub fn enabled_regions(&self) -> Vec<&'static str> {
        [
            ("background", self.background),
            ("skin", self.skin),
            ("nose", self.nose),
            ("eye_g", self.eye_g),
            ("r_eye", self.r_eye),
            ("l_eye", self.l_eye),
            ("r_brow", self.r_brow),
            ("l_brow", self.l_brow),
            ("r_ear", self.r_ear),
            ("l_ear", self.l_ear),
            ("mouth", self.mouth),
            ("u_lip", self.u_lip),
            ("l_lip", self.l_lip),
            ("hair", self.hair),
            ("hat", self.hat),
            ("ear_r", self.ear_r),
            ("neck_l", self.neck_l),
            ("neck", self.neck),
            ("cloth", self.cloth),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_regions() {
        let regions = FaceParsingConfig::default().enabled_regions();
        assert_eq!(regions.len(), 11);
        assert!(regions.contains(&"skin"));
        assert!(!regions.contains(&"background"));
        assert!(!regions.contains(&"cloth"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FaceParsingConfig = serde_json::from_str(r#"{"cloth": true, "hair": false}"#).unwrap();
        assert!(config.cloth);
        assert!(!config.hair);
        assert!(config.skin);
    }
}
