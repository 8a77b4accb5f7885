use id_arena::Id;

use crate::model::Model;
use crate::rendering::render_model::RenderModelId;

pub type SceneModelId = Id<SceneModel>;

pub struct SceneModel {
    pub name: String,
    pub model: Model,
    /// GPU-side counterpart, filled in by the renderer once the model
    /// has been uploaded.
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(model: Model) -> Self {
        Self {
            name: model.name.clone(),
            model,
            render_model: None,
        }
    }
}
