//! One rendering tick: clock, light, shading parameters, draws

use anyhow::Result;
use bevy::math::Affine3A;
use bevy::prelude::*;

use super::animator::{SimulationClock, orbit_light_position};
use super::params::{ShadingParameters, ShadingSetup};
use super::toggles::LightingToggles;

/// Radius of the debug sphere drawn at the light position
pub const LIGHT_MARKER_RADIUS: f32 = 0.1;

/// A drawable instance for the current frame with its world transform resolved
pub trait PosedSurface {
    type Geometry;

    /// Geometry binding for the lighting shader, if this surface has one.
    ///
    /// Surfaces without one (overlays, helpers) are skipped by the frame tick.
    fn geometry(&self) -> Option<&Self::Geometry>;

    fn world_from_local(&self) -> Affine3A;
}

/// Receives the draw work of one tick
pub trait FrameSink {
    type Geometry;

    fn draw_surface(
        &mut self,
        geometry: &Self::Geometry,
        world_from_local: Affine3A,
        params: &ShadingParameters,
    );

    fn draw_light_marker(&mut self, center: Vec3, radius: f32);

    fn draw_light_vector(&mut self, from: Vec3, to: Vec3);
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub light_position: Vec4,
    pub surfaces_drawn: usize,
    pub surfaces_skipped: usize,
    pub light_vector_drawn: bool,
}

/// Drives the lighting scene; the only state carried across ticks is the clock
#[derive(Resource, Debug, Clone)]
pub struct FrameOrchestrator {
    clock: SimulationClock,
    light_position: Vec4,
    anchor: Vec3,
}

impl FrameOrchestrator {
    /// `anchor` is the fixed world point the light vector starts from
    pub fn new(anchor: Vec3) -> Self {
        Self {
            clock: SimulationClock::default(),
            light_position: orbit_light_position(0.0),
            anchor,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn light_position(&self) -> Vec4 {
        self.light_position
    }

    /// Run one tick.
    ///
    /// If the parameter set cannot be built no surface is drawn, the clock has still advanced
    /// and the error is returned; the light marker is drawn either way.
    pub fn tick<S, K>(
        &mut self,
        delta_secs: f64,
        toggles: &LightingToggles,
        setup: &ShadingSetup,
        eye_position: Vec3,
        surfaces: impl IntoIterator<Item = S>,
        sink: &mut K,
    ) -> Result<FrameReport>
    where
        S: PosedSurface,
        K: FrameSink<Geometry = S::Geometry>,
    {
        self.clock.advance(delta_secs);
        self.light_position = orbit_light_position(self.clock.elapsed());
        let light = self.light_position.truncate();

        let params = setup.build(toggles, self.light_position, eye_position);

        let mut report = FrameReport {
            light_position: self.light_position,
            surfaces_drawn: 0,
            surfaces_skipped: 0,
            light_vector_drawn: false,
        };

        if let Ok(params) = &params {
            for surface in surfaces {
                match surface.geometry() {
                    Some(geometry) => {
                        sink.draw_surface(geometry, surface.world_from_local(), params);
                        report.surfaces_drawn += 1;
                    }
                    None => report.surfaces_skipped += 1,
                }
            }
        }

        sink.draw_light_marker(light, LIGHT_MARKER_RADIUS);
        if toggles.show_light_vector {
            sink.draw_light_vector(self.anchor, light);
            report.light_vector_drawn = true;
        }

        params.map(|_| report)
    }
}
