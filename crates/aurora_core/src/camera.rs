//! Perspective camera with depth of field, bokeh shapes, optional barrel
//! distortion and motion blur.

use crate::context::RenderingContext;
use crate::sampling::{concentric_sample_disk, sample_hexagon, sample_square};
use aurora_math::{Float, Point2, Quaternion, Ray, Transform, Vec3};

/// Aperture shape used for depth-of-field sampling.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BokehShape {
    #[default]
    Circle,
    Hexagon,
    Square,
}

/// Depth of field settings.
#[derive(Copy, Clone, Debug)]
pub struct DofSettings {
    /// Distance from the camera of the plane of perfect focus.
    pub focal_plane_distance: Float,

    /// Lens radius; zero disables depth of field.
    pub aperture: Float,

    /// Aperture shape.
    pub bokeh_shape: BokehShape,
}

impl Default for DofSettings {
    /// Focus at two units with a slight blur.
    fn default() -> Self {
        Self {
            focal_plane_distance: 2.0,
            aperture: 0.0,
            bokeh_shape: BokehShape::Circle,
        }
    }
}

/// Barrel distortion settings: `r' = r · (k0 + k1·r²)` around the image
/// center.
#[derive(Copy, Clone, Debug)]
pub struct BarrelDistortion {
    /// Constant factor k0.
    pub const_factor: Float,

    /// Quadratic factor k1; zero leaves the image undistorted.
    pub variable_factor: Float,

    /// Whether distortion is applied at all.
    pub enabled: bool,
}

impl Default for BarrelDistortion {
    /// Disabled, identity mapping.
    fn default() -> Self {
        Self {
            const_factor: 1.0,
            variable_factor: 0.0,
            enabled: false,
        }
    }
}

/// Scene camera. Looks along +Z in camera space with +X to the right and +Y
/// up; `transform` places it in the world.
pub struct Camera {
    /// Camera placement.
    pub transform: Transform,

    /// Linear velocity over the shutter interval, for motion blur.
    pub linear_velocity: Vec3,

    /// Angular velocity over the shutter interval, for motion blur.
    pub angular_velocity: Quaternion,

    /// Width to height ratio.
    pub aspect_ratio: Float,

    /// Vertical field of view in radians.
    pub field_of_view: Float,

    /// Depth of field settings.
    pub dof: DofSettings,

    /// Lens distortion settings.
    pub barrel_distortion: BarrelDistortion,

    /// Cached tan(FoV/2).
    tan_half_fov: Float,

    /// Set when both velocities are zero, making ray generation a pure
    /// function of the screen coordinates.
    is_static: bool,
}

impl Default for Camera {
    /// A static camera at the origin with a 60° vertical field of view.
    fn default() -> Self {
        let mut camera = Self {
            transform: Transform::default(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Quaternion::IDENTITY,
            aspect_ratio: 1.0,
            field_of_view: 60.0_f32.to_radians(),
            dof: DofSettings::default(),
            barrel_distortion: BarrelDistortion::default(),
            tan_half_fov: 0.0,
            is_static: true,
        };
        camera.update();
        camera
    }
}

impl Camera {
    /// Configure the perspective projection.
    ///
    /// * `transform`    - Camera placement.
    /// * `aspect_ratio` - Width to height ratio.
    /// * `field_of_view` - Vertical field of view in radians.
    pub fn set_perspective(&mut self, transform: Transform, aspect_ratio: Float, field_of_view: Float) {
        debug_assert!(aspect_ratio > 0.0);
        debug_assert!(field_of_view > 0.0 && field_of_view < aurora_math::PI);
        self.transform = transform;
        self.aspect_ratio = aspect_ratio;
        self.field_of_view = field_of_view;
        self.update();
    }

    /// Set the angular velocity used for motion blur.
    ///
    /// * `velocity` - Rotation applied over one shutter interval.
    pub fn set_angular_velocity(&mut self, velocity: Quaternion) {
        self.angular_velocity = velocity;
        self.update();
    }

    /// Set the linear velocity used for motion blur.
    ///
    /// * `velocity` - Translation applied over one shutter interval.
    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
        self.update();
    }

    /// Refresh cached values after a parameter change.
    fn update(&mut self) {
        self.tan_half_fov = (self.field_of_view * 0.5).tan();
        self.is_static = self.linear_velocity == Vec3::ZERO
            && self.angular_velocity == Quaternion::IDENTITY;
    }

    /// Sample the camera transform at a shutter-relative time.
    ///
    /// * `time` - Time in [0, 1).
    pub fn sample_transform(&self, time: Float) -> Transform {
        if self.is_static {
            return self.transform;
        }
        let moved = Transform::new(
            self.transform.translation + self.linear_velocity,
            self.transform.rotation.compose(&self.angular_velocity),
        );
        Transform::interpolate(&self.transform, &moved, time)
    }

    /// Sample an offset on the lens according to the bokeh shape, scaled by
    /// the aperture.
    ///
    /// * `ctx` - The rendering context providing the random stream.
    fn generate_bokeh(&self, ctx: &mut RenderingContext) -> Point2 {
        let u = ctx.rng.uniform_vec2();
        let p = match self.dof.bokeh_shape {
            BokehShape::Circle => concentric_sample_disk(&u),
            BokehShape::Hexagon => {
                let sector = ctx.rng.uniform();
                sample_hexagon(&u, sector)
            }
            BokehShape::Square => sample_square(&u),
        };
        p * self.dof.aperture
    }

    /// Generate a primary ray for normalized screen coordinates.
    ///
    /// * `coords` - Screen position; x and y in [0, 1).
    /// * `ctx`    - The rendering context (random stream and sample time).
    pub fn generate_ray(&self, coords: &Point2, ctx: &mut RenderingContext) -> Ray {
        // Remap to [-1, 1] around the image center.
        let mut x = 2.0 * coords.x - 1.0;
        let mut y = 2.0 * coords.y - 1.0;

        if self.barrel_distortion.enabled {
            let r2 = x * x + y * y;
            let factor =
                self.barrel_distortion.const_factor + self.barrel_distortion.variable_factor * r2;
            x *= factor;
            y *= factor;
        }

        let mut origin = Vec3::ZERO;
        let mut dir = Vec3::new(
            x * self.tan_half_fov * self.aspect_ratio,
            y * self.tan_half_fov,
            1.0,
        )
        .normalize();

        // Shift the origin across the lens and re-aim at the focal plane.
        if self.dof.aperture > 0.0 {
            let lens = self.generate_bokeh(ctx);
            let ft = self.dof.focal_plane_distance / dir.z;
            let focus = dir * ft;
            origin = Vec3::new(lens.x, lens.y, 0.0);
            dir = (focus - origin).normalize();
        }

        let transform = self.sample_transform(ctx.time);
        transform.transform_ray(&Ray::new(origin, dir, ctx.time))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
