use glam::{EulerRot, Mat4, Quat, Vec3};
use id_arena::Arena;
use std::collections::HashMap;

use crate::model::{Buffers, Model};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    gltf_mesh_to_model: HashMap<usize, SceneModelId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            gltf_mesh_to_model: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    /// Spawns every node of a glTF scene under `parent`, sharing mesh
    /// data between nodes that reference the same glTF mesh.
    pub fn spawn_gltf_scene(
        &mut self,
        buffers: Buffers,
        scene: &gltf::Scene,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<()> {
        for node in scene.nodes() {
            self.spawn_gltf_node(buffers, &node, parent)?;
        }

        Ok(())
    }

    fn spawn_gltf_node(
        &mut self,
        buffers: Buffers,
        node: &gltf::Node,
        parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let mut object = Object3D::default();
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        object.name = node_name.clone();

        let (translation, rotation, scale) = node.transform().decomposed();
        let rotation = Quat::from_array(rotation).to_euler(EulerRot::XYZ);

        object.transform.set_transform(
            translation.into(),
            Vec3::new(rotation.0, rotation.1, rotation.2),
            scale[0], // Assume uniform scale for simplicity
        );

        if let Some(mesh) = node.mesh() {
            let mesh_index = mesh.index();

            let mesh_id = match self.gltf_mesh_to_model.get(&mesh_index).copied() {
                Some(mesh_id) => mesh_id,
                None => {
                    let mesh_name = mesh
                        .name()
                        .map(String::from)
                        .unwrap_or_else(|| format!("{} (Mesh)", node_name));

                    let model = Model::from_gltf(mesh_name, mesh, buffers)?;
                    let mesh_id = self.add_model(SceneModel::new(model));
                    self.gltf_mesh_to_model.insert(mesh_index, mesh_id);

                    mesh_id
                }
            };

            object.model_id = Some(mesh_id);
        }

        let object_id = self.add_object(object);

        if let Some(parent_id) = parent {
            self.set_object_parent(object_id, Some(parent_id));
        }

        for child in node.children() {
            self.spawn_gltf_node(buffers, &child, Some(object_id))?;
        }

        Ok(object_id)
    }

    /// Flags `root` and all of its descendants that carry a lit model
    /// as shadow casters and receivers. Unlit meshes keep both off.
    pub fn mark_shadow_flags(&mut self, root: ObjectId) {
        let (lit, child_ids) = match self.objects.get(root) {
            Some(object) => {
                let lit = object
                    .model_id
                    .and_then(|id| self.models.get(id))
                    .map(|scene_model| scene_model.model.lit)
                    .unwrap_or(false);
                (lit, object.child_ids.clone())
            }
            None => return,
        };

        if lit {
            if let Some(object) = self.objects.get_mut(root) {
                object.cast_shadow = true;
                object.receive_shadow = true;
            }
        }

        for child_id in child_ids {
            self.mark_shadow_flags(child_id);
        }
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self.objects.iter().filter_map(|(id, object)| {
            if object.parent_id.is_none() {
                Some(id)
            } else {
                None
            }
        });

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Vec3,
        scale: f32,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_model(name: &str, lit: bool) -> Model {
        Model {
            name: name.to_string(),
            lit,
            primitives: Vec::new(),
        }
    }

    #[test]
    fn test_world_matrix_propagates_to_children() {
        let mut scene = Scene::new();

        let parent = scene.add_object(Object3D::named("parent"));
        let child = scene.add_object(Object3D::named("child"));
        scene.set_object_parent(child, Some(parent));

        scene.set_object_translation(parent, Vec3::new(1.0, 0.0, 0.0));
        scene.set_object_translation(child, Vec3::new(0.0, 2.0, 0.0));
        scene.late_update();

        let world = *scene
            .get_object_transform(child)
            .unwrap()
            .get_world_matrix();
        let position = world.transform_point3(Vec3::ZERO);

        assert!((position - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_parent_scale_applies_to_children() {
        let mut scene = Scene::new();

        let parent = scene.add_object(Object3D::named("parent"));
        let child = scene.add_object(Object3D::named("child"));
        scene.set_object_parent(child, Some(parent));

        scene.set_object_transform(parent, Vec3::ZERO, Vec3::ZERO, 0.005);
        scene.set_object_translation(child, Vec3::new(100.0, 0.0, 0.0));
        scene.late_update();

        let world = *scene
            .get_object_transform(child)
            .unwrap()
            .get_world_matrix();
        let position = world.transform_point3(Vec3::ZERO);

        assert!((position - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_mark_shadow_flags_skips_unlit_models() {
        let mut scene = Scene::new();

        let lit_model = scene.add_model(SceneModel::new(empty_model("body", true)));
        let unlit_model = scene.add_model(SceneModel::new(empty_model("decal", false)));

        let root = scene.add_object(Object3D::named("root"));

        let mut lit_object = Object3D::named("body");
        lit_object.model_id = Some(lit_model);
        let lit_object = scene.add_object(lit_object);
        scene.set_object_parent(lit_object, Some(root));

        let mut unlit_object = Object3D::named("decal");
        unlit_object.model_id = Some(unlit_model);
        let unlit_object = scene.add_object(unlit_object);
        scene.set_object_parent(unlit_object, Some(root));

        scene.mark_shadow_flags(root);

        let lit = scene.get_object(lit_object).unwrap();
        assert!(lit.cast_shadow && lit.receive_shadow);

        let unlit = scene.get_object(unlit_object).unwrap();
        assert!(!unlit.cast_shadow && !unlit.receive_shadow);

        // The model-less root itself stays unflagged.
        let root = scene.get_object(root).unwrap();
        assert!(!root.cast_shadow && !root.receive_shadow);
    }

    #[test]
    fn test_transform_updates_are_lazy_until_late_update() {
        let mut scene = Scene::new();
        let object = scene.add_object(Object3D::named("solo"));

        scene.set_object_translation(object, Vec3::new(3.0, 0.0, 0.0));
        assert!(scene
            .get_object_transform(object)
            .unwrap()
            .is_world_dirty());

        scene.late_update();
        assert!(!scene
            .get_object_transform(object)
            .unwrap()
            .is_world_dirty());
    }
}
