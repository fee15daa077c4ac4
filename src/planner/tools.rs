use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PlanError, Result};

/// Which of the two single-channel tools a volume goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolId {
    /// Low-volume tool (p20).
    Small,
    /// High-volume tool (p300).
    Large,
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolId::Small => write!(f, "small"),
            ToolId::Large => write!(f, "large"),
        }
    }
}

/// Operating range of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolRange {
    /// Tool identity.
    pub tool_id: ToolId,
    /// Smallest volume the tool handles accurately (µL).
    pub min_volume: f64,
    /// Tool capacity (µL).
    pub max_volume: f64,
}

impl ToolRange {
    /// p20 single-channel: 1–20 µL.
    pub const P20: ToolRange = ToolRange {
        tool_id: ToolId::Small,
        min_volume: 1.0,
        max_volume: 20.0,
    };

    /// p300 single-channel: 20–300 µL.
    pub const P300: ToolRange = ToolRange {
        tool_id: ToolId::Large,
        min_volume: 20.0,
        max_volume: 300.0,
    };
}

/// Inclusive volume limits declared for one pass of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBounds {
    /// Lowest accepted volume (µL).
    pub min: f64,
    /// Highest accepted volume (µL).
    pub max: f64,
}

impl VolumeBounds {
    /// Water additions for standardization: 0–200 µL. Zero means "no water".
    pub const WATER: VolumeBounds = VolumeBounds { min: 0.0, max: 200.0 };

    /// DNA transfers for standardization: 1–200 µL.
    pub const DNA: VolumeBounds = VolumeBounds { min: 1.0, max: 200.0 };

    /// Anything handled by the small tool alone: 1–20 µL.
    pub const SMALL_TOOL: VolumeBounds = VolumeBounds { min: 1.0, max: 20.0 };

    /// Create bounds.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Fail with `VolumeOutOfRange` unless `min <= volume <= max`.
    pub fn check(&self, volume: f64, context: &str) -> Result<()> {
        if !(volume >= self.min && volume <= self.max) {
            return Err(PlanError::VolumeOutOfRange {
                volume,
                min: self.min,
                max: self.max,
                context: context.to_string(),
            });
        }
        Ok(())
    }
}

/// The tools mounted for a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ToolSet {
    /// Low-volume tool, if mounted.
    pub small: Option<ToolRange>,
    /// High-volume tool, if mounted.
    pub large: Option<ToolRange>,
}

impl ToolSet {
    /// Both a p20 and a p300.
    pub const PAIR: ToolSet = ToolSet {
        small: Some(ToolRange::P20),
        large: Some(ToolRange::P300),
    };

    /// Only a p20.
    pub const SMALL_ONLY: ToolSet = ToolSet {
        small: Some(ToolRange::P20),
        large: None,
    };

    /// Look up the range of a mounted tool.
    pub fn range(&self, tool: ToolId) -> Option<&ToolRange> {
        match tool {
            ToolId::Small => self.small.as_ref(),
            ToolId::Large => self.large.as_ref(),
        }
    }

    /// Pick the tool for `volume`.
    ///
    /// The volume is first checked against `bounds`. Then `0 < v <= small
    /// capacity` goes to the small tool and anything above goes to the large
    /// tool. A volume of exactly zero selects no tool and returns `None`; the
    /// caller skips the step. Volumes no mounted tool can take fail with
    /// `VolumeOutOfRange`.
    pub fn select_tool(&self, volume: f64, bounds: VolumeBounds, context: &str) -> Result<Option<ToolId>> {
        bounds.check(volume, context)?;

        if volume <= 0.0 {
            debug!("{}: volume is 0, no tool selected, step skipped", context);
            return Ok(None);
        }

        let threshold = self.small.map(|t| t.max_volume).unwrap_or(0.0);
        let chosen = if volume <= threshold {
            self.small
        } else {
            self.large.filter(|t| volume <= t.max_volume)
        };

        match chosen {
            Some(range) => {
                if volume < range.min_volume {
                    warn!(
                        "{}: {} uL is below the {} tool minimum of {} uL",
                        context, volume, range.tool_id, range.min_volume
                    );
                }
                debug!("{}: {} uL -> {} tool", context, volume, range.tool_id);
                Ok(Some(range.tool_id))
            }
            None => {
                let max = self
                    .large
                    .or(self.small)
                    .map(|t| t.max_volume)
                    .unwrap_or(0.0);
                Err(PlanError::VolumeOutOfRange {
                    volume,
                    min: bounds.min,
                    max,
                    context: format!("{} (no mounted tool takes this volume)", context),
                })
            }
        }
    }
}
