use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Channel needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),
    #[error("Domain has {domain} breakpoints but output has {output}")]
    LengthMismatch { domain: usize, output: usize },
    #[error("Domain breakpoint {0} is outside [0, 1]")]
    OutOfRange(f64),
    #[error("Domain must be non-decreasing (breakpoint {index})")]
    NotMonotonic { index: usize },
    #[error("Output breakpoints mix units")]
    MixedUnits,
    #[error("Channel {0} is already registered")]
    DuplicateChannel(String),
    #[error("Invalid scroll edge: {0}")]
    InvalidEdge(String),
}

/// Vertical extent of a box. Element and viewport must share a coordinate space,
/// e.g. both from `getBoundingClientRect` with the viewport at `top = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    fn at(&self, edge: f64) -> f64 {
        self.top + edge * self.height
    }
}

/// "Element edge meets viewport edge", each edge a fraction of its box height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEdge {
    pub element: f64,
    pub viewport: f64,
}

impl ScrollEdge {
    pub const fn new(element: f64, viewport: f64) -> Self {
        Self { element, viewport }
    }
}

fn parse_edge(s: &str) -> Result<f64, MappingError> {
    match s {
        "start" => Ok(0.0),
        "center" => Ok(0.5),
        "end" => Ok(1.0),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| MappingError::InvalidEdge(other.to_string())),
    }
}

/// Parses the `"<element edge> <viewport edge>"` form, e.g. `"start end"` or `"0.25 center"`.
impl FromStr for ScrollEdge {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(MappingError::InvalidEdge(s.to_string()));
        };
        Ok(Self::new(parse_edge(element)?, parse_edge(viewport)?))
    }
}

/// The part of the scroll range tracked for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollWindow {
    pub start: ScrollEdge,
    pub end: ScrollEdge,
}

impl ScrollWindow {
    /// Element top at viewport bottom through element bottom at viewport top.
    pub const THROUGH: Self = Self {
        start: ScrollEdge::new(0.0, 1.0),
        end: ScrollEdge::new(1.0, 0.0),
    };
    /// Element top at viewport top through element bottom at viewport top.
    pub const LEAVING: Self = Self {
        start: ScrollEdge::new(0.0, 0.0),
        end: ScrollEdge::new(1.0, 0.0),
    };
    /// Element top at viewport bottom through element bottom at viewport bottom.
    pub const ENTERING: Self = Self {
        start: ScrollEdge::new(0.0, 1.0),
        end: ScrollEdge::new(1.0, 1.0),
    };

    pub fn parse(start: &str, end: &str) -> Result<Self, MappingError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

/// How far `element` has travelled through `window`, in [0, 1].
pub fn compute_fraction(element: Bounds, viewport: Bounds, window: ScrollWindow) -> f64 {
    // distance still to scroll before each meeting point (negative once passed)
    let to_start = element.at(window.start.element) - viewport.at(window.start.viewport);
    let to_end = element.at(window.end.element) - viewport.at(window.end.viewport);
    let length = to_end - to_start;
    if !length.is_finite() || length <= 0.0 {
        return if to_start > 0.0 { 0.0 } else { 1.0 };
    }
    (-to_start / length).clamp(0.0, 1.0)
}

/// Fraction of the whole document scrolled, for page-level progress.
pub fn page_fraction(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    compute_fraction(
        Bounds::new(-scroll_y, document_height),
        Bounds::new(0.0, viewport_height),
        ScrollWindow {
            start: ScrollEdge::new(0.0, 0.0),
            end: ScrollEdge::new(1.0, 1.0),
        },
    )
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;

    /// Whether two breakpoints can be interpolated between.
    fn compatible(_a: &Self, _b: &Self) -> bool {
        true
    }
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// A visual parameter with its CSS unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionValue {
    Number(f64),
    Percent(f64),
    Degrees(f64),
    Px(f64),
}

impl MotionValue {
    pub fn value(&self) -> f64 {
        match *self {
            MotionValue::Number(v)
            | MotionValue::Percent(v)
            | MotionValue::Degrees(v)
            | MotionValue::Px(v) => v,
        }
    }

    fn with_value(&self, v: f64) -> Self {
        match self {
            MotionValue::Number(_) => MotionValue::Number(v),
            MotionValue::Percent(_) => MotionValue::Percent(v),
            MotionValue::Degrees(_) => MotionValue::Degrees(v),
            MotionValue::Px(_) => MotionValue::Px(v),
        }
    }
}

impl Lerp for MotionValue {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.with_value(f64::lerp(&a.value(), &b.value(), t))
    }

    fn compatible(a: &Self, b: &Self) -> bool {
        std::mem::discriminant(a) == std::mem::discriminant(b)
    }
}

impl fmt::Display for MotionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionValue::Number(v) => write!(f, "{v}"),
            MotionValue::Percent(v) => write!(f, "{v}%"),
            MotionValue::Degrees(v) => write!(f, "{v}deg"),
            MotionValue::Px(v) => write!(f, "{v}px"),
        }
    }
}

/// One piecewise-linear mapping from fraction to output.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel<T> {
    domain: Vec<f64>,
    output: Vec<T>,
}

impl<T: Lerp + Clone> Channel<T> {
    pub fn new(domain: Vec<f64>, output: Vec<T>) -> Result<Self, MappingError> {
        if domain.len() != output.len() {
            return Err(MappingError::LengthMismatch {
                domain: domain.len(),
                output: output.len(),
            });
        }
        if domain.len() < 2 {
            return Err(MappingError::TooFewBreakpoints(domain.len()));
        }
        if let Some(&bad) = domain
            .iter()
            .find(|d| !d.is_finite() || !(0.0..=1.0).contains(*d))
        {
            return Err(MappingError::OutOfRange(bad));
        }
        if let Some(index) = domain.windows(2).position(|w| w[0] > w[1]) {
            return Err(MappingError::NotMonotonic { index: index + 1 });
        }
        if !output.windows(2).all(|w| T::compatible(&w[0], &w[1])) {
            return Err(MappingError::MixedUnits);
        }
        Ok(Self { domain, output })
    }

    /// Output at `fraction`. Clamps to the end values outside the domain; NaN
    /// maps to the first output.
    pub fn evaluate(&self, fraction: f64) -> T {
        let idx = self.domain.partition_point(|d| *d <= fraction);
        if idx == 0 {
            return self.output[0].clone();
        }
        if idx >= self.domain.len() {
            return self.output[self.output.len() - 1].clone();
        }

        let (d0, d1) = (self.domain[idx - 1], self.domain[idx]);
        let a = &self.output[idx - 1];
        if fraction == d0 {
            return a.clone();
        }
        let t = (fraction - d0) / (d1 - d0);
        T::lerp(a, &self.output[idx], t)
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }
}

/// Named channels evaluated against one shared fraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollMapping {
    channels: Vec<(String, Channel<MotionValue>)>,
}

impl ScrollMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_channel(
        &mut self,
        name: impl Into<String>,
        domain: Vec<f64>,
        output: Vec<MotionValue>,
    ) -> Result<(), MappingError> {
        let name = name.into();
        if self.channels.iter().any(|(n, _)| *n == name) {
            return Err(MappingError::DuplicateChannel(name));
        }
        let channel = Channel::new(domain, output)?;
        self.channels.push((name, channel));
        Ok(())
    }

    /// Builder form of [`ScrollMapping::register_channel`].
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        domain: Vec<f64>,
        output: Vec<MotionValue>,
    ) -> Result<Self, MappingError> {
        self.register_channel(name, domain, output)?;
        Ok(self)
    }

    pub fn evaluate(&self, name: &str, fraction: f64) -> Option<MotionValue> {
        self.channels
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.evaluate(fraction))
    }

    /// Every channel at one fraction, in registration order.
    pub fn frame(&self, fraction: f64) -> MappedFrame {
        MappedFrame {
            fraction,
            values: self
                .channels
                .iter()
                .map(|(n, c)| (n.clone(), c.evaluate(fraction)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappedFrame {
    pub fraction: f64,
    pub values: Vec<(String, MotionValue)>,
}

impl MappedFrame {
    pub fn get(&self, name: &str) -> Option<MotionValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Numeric part of a channel, or `default` if the channel is missing.
    pub fn number(&self, name: &str, default: f64) -> f64 {
        self.get(name).map(|v| v.value()).unwrap_or(default)
    }

    /// CSS text of a channel, e.g. `"50%"`.
    pub fn css(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_string()).unwrap_or_default()
    }
}

/// Hero parallax over [`ScrollWindow::LEAVING`]: content drifts down and fades,
/// the background drifts slower.
pub fn hero_parallax() -> Result<ScrollMapping, MappingError> {
    use MotionValue::{Number, Percent};
    ScrollMapping::new()
        .with_channel("y", vec![0.0, 1.0], vec![Percent(0.0), Percent(50.0)])?
        .with_channel("opacity", vec![0.0, 1.0], vec![Number(1.0), Number(0.0)])?
        .with_channel("background_y", vec![0.0, 1.0], vec![Percent(0.0), Percent(30.0)])
}

/// Section fade in and out over [`ScrollWindow::THROUGH`].
pub fn section_reveal() -> Result<ScrollMapping, MappingError> {
    use MotionValue::{Number, Px};
    ScrollMapping::new()
        .with_channel(
            "opacity",
            vec![0.0, 0.2, 0.8, 1.0],
            vec![Number(0.0), Number(1.0), Number(1.0), Number(0.0)],
        )?
        .with_channel("y", vec![0.0, 1.0], vec![Px(100.0), Px(-100.0)])
}
