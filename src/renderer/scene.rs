//! Game scene: the drawable objects and the per-mode render pass

use std::path::Path;

use super::backend::{Layer, RenderBackend};
use super::camera::Camera;
use super::renderable::{Material, RenderableObject};
use crate::assets::{AssetError, AssetLoader, ProgramSource, mesh};
use crate::sim::{EntityPool, GameMode, GameWorld};

pub const SKY_TEXTURE: &str = "sky.png";
pub const AIRCRAFT_TEXTURE: &str = "aircraft.png";
pub const START_TEXTURE: &str = "start.png";
pub const CLEAR_TEXTURE: &str = "clear.png";

/// All renderable objects of the game
///
/// `projectile` and `target` are shared by every entity of their pool.
#[derive(Debug, Clone)]
pub struct Scene {
    pub sky: RenderableObject,
    pub aircraft: RenderableObject,
    pub projectile: RenderableObject,
    pub target: RenderableObject,
    pub start_overlay: RenderableObject,
    pub clear_overlay: RenderableObject,
}

impl Scene {
    /// Build every program, mesh and texture; any failure aborts the load
    pub fn load<L: AssetLoader + ?Sized>(
        loader: &mut L,
        assets_dir: &Path,
    ) -> Result<Self, AssetError> {
        let lit = loader.build_program(&ProgramSource::lit())?;
        let overlay = loader.build_program(&ProgramSource::overlay())?;

        let quad = loader.load_mesh("quad", &mesh::quad())?;
        let aircraft_mesh = loader.load_mesh("aircraft", &mesh::aircraft())?;
        let projectile_mesh = loader.load_mesh("projectile", &mesh::projectile())?;
        let balloon_mesh = loader.load_mesh("balloon", &mesh::balloon())?;

        let sky_tex = loader.load_texture(&assets_dir.join(SKY_TEXTURE))?;
        let aircraft_tex = loader.load_texture(&assets_dir.join(AIRCRAFT_TEXTURE))?;
        let start_tex = loader.load_texture(&assets_dir.join(START_TEXTURE))?;
        let clear_tex = loader.load_texture(&assets_dir.join(CLEAR_TEXTURE))?;

        log::info!("Scene loaded from {}", assets_dir.display());

        Ok(Self {
            sky: RenderableObject::new(overlay, quad, Layer::Background).with_texture(sky_tex),
            aircraft: RenderableObject::new(lit, aircraft_mesh, Layer::Scene)
                .with_texture(aircraft_tex),
            projectile: RenderableObject::new(lit, projectile_mesh, Layer::Scene)
                .with_material(Material::PROJECTILE),
            target: RenderableObject::new(lit, balloon_mesh, Layer::Scene)
                .with_material(Material::BALLOON),
            start_overlay: RenderableObject::new(overlay, quad, Layer::Overlay)
                .with_texture(start_tex),
            clear_overlay: RenderableObject::new(overlay, quad, Layer::Overlay)
                .with_texture(clear_tex),
        })
    }

    /// Overlay shown in a mode, if any
    pub fn overlay_for(&self, mode: GameMode) -> Option<&RenderableObject> {
        match mode {
            GameMode::Start => Some(&self.start_overlay),
            GameMode::Playing => None,
            GameMode::Cleared => Some(&self.clear_overlay),
        }
    }

    /// Draw one frame of the world
    ///
    /// The sky is always drawn first. While playing, the aircraft, every
    /// projectile and every balloon follow in pool order; the other modes only
    /// show their overlay.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        world: &GameWorld,
        camera: &Camera,
    ) {
        self.sky.draw(backend, camera);

        if world.mode == GameMode::Playing {
            self.aircraft.set_translation(world.actor.position);
            self.aircraft.draw(backend, camera);

            draw_pool(&mut self.projectile, &world.projectiles, backend, camera);
            draw_pool(&mut self.target, &world.targets, backend, camera);
        } else if let Some(overlay) = self.overlay_for(world.mode) {
            overlay.draw(backend, camera);
        }
    }
}

fn draw_pool<B: RenderBackend + ?Sized>(
    object: &mut RenderableObject,
    pool: &EntityPool,
    backend: &mut B,
    camera: &Camera,
) {
    for entity in pool.iter() {
        object.set_translation(entity.position);
        object.draw(backend, camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::FrameRecorder;
    use crate::renderer::testing::MockLoader;
    use crate::sim::{Entity, TickInput, tick};
    use crate::tuning::Tuning;
    use glam::{Mat4, Vec3};

    fn loaded() -> (Scene, MockLoader) {
        let mut loader = MockLoader::default();
        let scene = Scene::load(&mut loader, Path::new("assets")).unwrap();
        (scene, loader)
    }

    #[test]
    fn test_load_builds_everything() {
        let (scene, loader) = loaded();
        assert_eq!(loader.programs, vec!["lit", "overlay"]);
        assert_eq!(loader.meshes.len(), 4);
        assert_eq!(loader.textures.len(), 4);
        assert_eq!(loader.textures[0], Path::new("assets").join("sky.png"));

        assert_eq!(scene.sky.layer(), Layer::Background);
        assert_eq!(scene.start_overlay.layer(), Layer::Overlay);
        assert_eq!(scene.target.texture(), None);
        assert_eq!(scene.target.material, Material::BALLOON);
        assert!(scene.aircraft.texture().is_some());
    }

    #[test]
    fn test_load_failure_names_resource() {
        let mut loader = MockLoader {
            fail_texture: Some("clear.png".into()),
            ..Default::default()
        };
        let err = Scene::load(&mut loader, Path::new("assets")).unwrap_err();
        assert!(err.resource().ends_with("clear.png"));
    }

    #[test]
    fn test_start_mode_draws_overlay() {
        let (mut scene, _) = loaded();
        let tuning = Tuning::default();
        let world = GameWorld::new(1, &tuning);
        let camera = Camera::new(800, 600);
        let mut rec = FrameRecorder::new();

        scene.render(&mut rec, &world, &camera);

        // Sky and start overlay only
        let draws = rec.take_draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].layer, Layer::Background);
        assert_eq!(draws[0].texture, scene.sky.texture());
        assert_eq!(draws[1].layer, Layer::Overlay);
        assert_eq!(draws[1].texture, scene.start_overlay.texture());
    }

    #[test]
    fn test_playing_mode_draws_pools() {
        let (mut scene, _) = loaded();
        let tuning = Tuning::default();
        let mut world = GameWorld::new(1, &tuning);
        tick(
            &mut world,
            &TickInput {
                confirm: true,
                ..Default::default()
            },
            &tuning,
        );
        world.projectiles.push_back(Entity::new(Vec3::new(0.0, 0.0, 10.0)));
        world.projectiles.push_back(Entity::new(Vec3::new(0.0, 0.0, 0.0)));
        let camera = Camera::new(800, 600);
        let mut rec = FrameRecorder::new();

        scene.render(&mut rec, &world, &camera);
        let draws = rec.take_draws();

        // sky + aircraft + 2 projectiles + 50 balloons, no overlay
        assert_eq!(draws.len(), 54);
        assert!(draws.iter().all(|d| d.layer != Layer::Overlay));

        // Each pooled draw carries its own translation
        let first_projectile = Mat4::from_cols_array_2d(&draws[2].uniforms.mv);
        let expected = camera.view * Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
        assert!(first_projectile.abs_diff_eq(expected, 1e-5));
        assert_eq!(draws[4].mesh, scene.target.mesh());
    }

    #[test]
    fn test_cleared_mode_draws_clear_overlay() {
        let (mut scene, _) = loaded();
        let tuning = Tuning::default();
        let mut world = GameWorld::new(1, &tuning);
        world.targets = EntityPool::new();
        world.mode = GameMode::Cleared;
        let mut rec = FrameRecorder::new();

        scene.render(&mut rec, &world, &Camera::new(800, 600));
        let draws = rec.take_draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[1].texture, scene.clear_overlay.texture());
        assert_eq!(draws[1].layer, Layer::Overlay);
    }
}
