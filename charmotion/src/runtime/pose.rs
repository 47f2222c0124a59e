use crate::{BoneTransform, SkeletonData};
use glam::Mat4;

/// Per-character bone buffers: sampled local transforms, composed world matrices and the
/// skinning matrices handed to the renderer.
#[derive(Clone, Debug, Default)]
pub struct Pose {
    pub locals: Vec<BoneTransform>,
    world: Vec<Mat4>,
    skinning: Vec<Mat4>,
}

impl Pose {
    /// A pose holding the skeleton's bind transforms, already composed.
    pub fn bind(skeleton: &SkeletonData) -> Self {
        let locals = skeleton
            .bones()
            .iter()
            .map(|b| BoneTransform {
                position: b.position,
                rotation: b.rotation,
                scale: b.scale,
            })
            .collect::<Vec<_>>();
        let mut pose = Self {
            world: vec![Mat4::IDENTITY; locals.len()],
            skinning: vec![Mat4::IDENTITY; locals.len()],
            locals,
        };
        pose.update_world_transforms(skeleton);
        pose
    }

    pub fn len(&self) -> usize {
        self.locals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Model-space transform of each bone, indexed by bone id.
    pub fn world_matrices(&self) -> &[Mat4] {
        &self.world
    }

    /// `world * inverse_bind` for each bone, indexed by bone id.
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning
    }

    /// Composes the hierarchy in one forward pass. Relies on `SkeletonData`'s guarantee that
    /// every parent precedes its children.
    pub fn update_world_transforms(&mut self, skeleton: &SkeletonData) {
        let bones = skeleton.bones();
        debug_assert_eq!(bones.len(), self.locals.len());

        for (i, (bone, local)) in bones.iter().zip(&self.locals).enumerate() {
            let local = local_matrix(local);
            self.world[i] = match bone.parent {
                Some(parent) => self.world[parent] * local,
                None => local,
            };
            self.skinning[i] = self.world[i] * bone.inverse_bind;
        }
    }
}

pub fn local_matrix(transform: &BoneTransform) -> Mat4 {
    Mat4::from_translation(transform.position)
        * Mat4::from_quat(transform.rotation.normalize())
        * Mat4::from_scale(transform.scale)
}
