//! Joystick coordinate transforms.
//!
//! A transform takes the (x, y) stick reading in −1.0..1.0 and returns an
//! adjusted pair. Transforms compose: [`TransformationBuilder`] produces an
//! immutable [`Transformation`] chain applied left-to-right, each unit
//! feeding the next.

/// A single joystick coordinate transform.
pub trait JoystickTransform: Send {
    /// Returns the transformed coordinate given the original stick value.
    fn get_value(&self, original: (f32, f32)) -> (f32, f32);
}

/// Zeroes each axis below a deadband, then rescales the remainder back to
/// full range so maximum deflection still reads 1.0.
///
/// The per-axis deadband widens linearly with the magnitude of the *other*
/// axis (the spread terms), which suppresses cross-talk when one axis is
/// pinned.
pub struct Deadband {
    x_deadband: f32,
    y_deadband: f32,
    x_spread: f32,
    y_spread: f32,
}

impl Deadband {
    pub fn new(x_deadband: f32, y_deadband: f32) -> Self {
        Self::with_spread(x_deadband, y_deadband, 0.0, 0.0)
    }

    pub fn with_spread(x_deadband: f32, y_deadband: f32, x_spread: f32, y_spread: f32) -> Self {
        Self { x_deadband, y_deadband, x_spread, y_spread }
    }

    fn apply(value: f32, deadband: f32) -> f32 {
        let magnitude = value.abs();
        if magnitude < deadband {
            0.0
        } else {
            ((magnitude - deadband) / (1.0 - deadband)).copysign(value)
        }
    }
}

impl JoystickTransform for Deadband {
    fn get_value(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let x_deadband = self.x_deadband + y.abs() * self.x_spread;
        let y_deadband = self.y_deadband + x.abs() * self.y_spread;
        (Self::apply(x, x_deadband), Self::apply(y, y_deadband))
    }
}

/// Raises each axis to a power, flattening response near zero for finer
/// control while preserving the endpoints (`|v| = 1` maps to 1).
pub struct ExpoCurve {
    x_curve: f32,
    y_curve: f32,
}

impl ExpoCurve {
    pub fn new(x_curve: f32, y_curve: f32) -> Self {
        Self { x_curve, y_curve }
    }
}

impl JoystickTransform for ExpoCurve {
    fn get_value(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (
            x.abs().powf(self.x_curve).copysign(x),
            y.abs().powf(self.y_curve).copysign(y),
        )
    }
}

/// Stretches the rounded corners of the stick housing so diagonal deflection
/// reaches the same magnitude as axis-aligned deflection.
///
/// `radius` is the radius of the circle forming the housing corners, in stick
/// units. Values are clamped to unit magnitude after scaling.
pub struct Fisheye {
    radius: f32,
}

impl Fisheye {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl JoystickTransform for Fisheye {
    fn get_value(&self, (x, y): (f32, f32)) -> (f32, f32) {
        let mut x_abs = x.abs();
        let mut y_abs = y.abs();
        let corner = (self.radius * self.radius - 1.0).sqrt();
        if x_abs >= corner && y_abs >= corner {
            let scale = (x_abs / y_abs).min(y_abs / x_abs).hypot(1.0) / self.radius;
            x_abs *= scale;
            y_abs *= scale;
        }
        (x_abs.min(1.0).copysign(x), y_abs.min(1.0).copysign(y))
    }
}

/// An immutable ordered chain of transforms. Build with
/// [`TransformationBuilder`].
pub struct Transformation {
    transforms: Vec<Box<dyn JoystickTransform>>,
}

impl Transformation {
    /// Folds the input through every transform in order.
    pub fn get_value(&self, original: (f32, f32)) -> (f32, f32) {
        self.transforms
            .iter()
            .fold(original, |value, transform| transform.get_value(value))
    }
}

/// Builds a [`Transformation`] chain, first transform first.
///
/// ```
/// use openpad::transform::{Deadband, ExpoCurve, TransformationBuilder};
///
/// let chain = TransformationBuilder::new(Deadband::new(0.05, 0.05))
///     .and_then(ExpoCurve::new(2.0, 2.0))
///     .build();
/// assert_eq!(chain.get_value((0.0, 0.0)), (0.0, 0.0));
/// ```
pub struct TransformationBuilder {
    transforms: Vec<Box<dyn JoystickTransform>>,
}

impl TransformationBuilder {
    pub fn new(first: impl JoystickTransform + 'static) -> Self {
        Self { transforms: vec![Box::new(first)] }
    }

    /// Appends a transform to run after the previously added one.
    pub fn and_then(mut self, next: impl JoystickTransform + 'static) -> Self {
        self.transforms.push(Box::new(next));
        self
    }

    pub fn build(self) -> Transformation {
        Transformation { transforms: self.transforms }
    }
}
