//! Candidate surfaces reported by the host's scene understanding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Point3, Vec3};

/// Semantic label the host attaches to a detected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceLabel {
    Floor,
    Ceiling,
    WallFace,
    Table,
    Couch,
    Bed,
    Storage,
    Screen,
    Other,
}

impl SurfaceLabel {
    pub const ALL: &'static [SurfaceLabel] = &[
        SurfaceLabel::Floor,
        SurfaceLabel::Ceiling,
        SurfaceLabel::WallFace,
        SurfaceLabel::Table,
        SurfaceLabel::Couch,
        SurfaceLabel::Bed,
        SurfaceLabel::Storage,
        SurfaceLabel::Screen,
        SurfaceLabel::Other,
    ];

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::WallFace => "wall_face",
            Self::Table => "table",
            Self::Couch => "couch",
            Self::Bed => "bed",
            Self::Storage => "storage",
            Self::Screen => "screen",
            Self::Other => "other",
        }
    }
}

/// Small set of [`SurfaceLabel`]s.
///
/// Serialized as a list of label names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SurfaceLabel>", into = "Vec<SurfaceLabel>")]
pub struct SurfaceLabels(u32);

impl SurfaceLabels {
    pub const NONE: Self = Self(0);
    pub const TABLE: Self = Self::single(SurfaceLabel::Table);
    pub const FLOOR: Self = Self::single(SurfaceLabel::Floor);

    #[must_use]
    pub const fn single(label: SurfaceLabel) -> Self {
        Self(label.bit())
    }

    #[must_use]
    pub const fn with(self, label: SurfaceLabel) -> Self {
        Self(self.0 | label.bit())
    }

    #[must_use]
    pub const fn contains(self, label: SurfaceLabel) -> bool {
        self.0 & label.bit() != 0
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SurfaceLabel> {
        SurfaceLabel::ALL
            .iter()
            .copied()
            .filter(move |label| self.contains(*label))
    }
}

impl FromIterator<SurfaceLabel> for SurfaceLabels {
    fn from_iter<I: IntoIterator<Item = SurfaceLabel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl From<Vec<SurfaceLabel>> for SurfaceLabels {
    fn from(labels: Vec<SurfaceLabel>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<SurfaceLabels> for Vec<SurfaceLabel> {
    fn from(labels: SurfaceLabels) -> Self {
        labels.iter().collect()
    }
}

impl fmt::Display for SurfaceLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(SurfaceLabel::name).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Rectangular plane extent of a surface, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneExtent {
    pub width: f64,
    pub height: f64,
}

/// One detected surface as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCandidate {
    #[serde(default)]
    pub name: String,
    pub center: Point3,
    pub plane_normal: Vec3,
    pub forward_axis: Vec3,
    pub right_axis: Vec3,
    /// `None` for anchors that carry no plane rectangle.
    #[serde(default)]
    pub extent: Option<PlaneExtent>,
    #[serde(default)]
    pub labels: SurfaceLabels,
}

impl SurfaceCandidate {
    /// Horizontal surface facing world up, with `+X` right and `+Z` forward.
    #[must_use]
    pub fn horizontal(name: &str, center: Point3, width: f64, height: f64, labels: SurfaceLabels) -> Self {
        Self {
            name: name.to_owned(),
            center,
            plane_normal: Vec3::Y,
            forward_axis: Vec3::Z,
            right_axis: Vec3::X,
            extent: Some(PlaneExtent { width, height }),
            labels,
        }
    }
}

/// Surface query seam.
///
/// `None` means the host has no room or scene to query; an empty slice means
/// the scene is known but holds no surfaces. Neither is an error.
pub trait SurfaceSource {
    fn candidate_surfaces(&self) -> Option<&[SurfaceCandidate]>;
}

impl SurfaceSource for [SurfaceCandidate] {
    fn candidate_surfaces(&self) -> Option<&[SurfaceCandidate]> {
        Some(self)
    }
}

impl SurfaceSource for Vec<SurfaceCandidate> {
    fn candidate_surfaces(&self) -> Option<&[SurfaceCandidate]> {
        Some(self.as_slice())
    }
}

impl<S: SurfaceSource> SurfaceSource for Option<S> {
    fn candidate_surfaces(&self) -> Option<&[SurfaceCandidate]> {
        self.as_ref().and_then(SurfaceSource::candidate_surfaces)
    }
}
