//! Point lights and a helper that flattens their properties for uniform arrays.

use cgmath::Vector3;

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub id: String,
    pub position: Vector3<f32>,
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl Light {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Vector3::new(0.0, 0.0, 0.0),
            ambient: [0.0; 4],
            diffuse: [0.0; 4],
            specular: [0.0; 4],
        }
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
    }

    pub fn set_diffuse(&mut self, diffuse: [f32; 4]) {
        self.diffuse = diffuse;
    }

    pub fn set_ambient(&mut self, ambient: [f32; 4]) {
        self.ambient = ambient;
    }

    pub fn set_specular(&mut self, specular: [f32; 4]) {
        self.specular = specular;
    }
}

/// Light property selected by [`LightsManager::get_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightProperty {
    Position,
    Ambient,
    Diffuse,
    Specular,
}

#[derive(Debug, Clone, Default)]
pub struct LightsManager {
    lights: Vec<Light>,
}

impl LightsManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn get(&self, id: &str) -> Option<&Light> {
        self.lights.iter().find(|light| light.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|light| light.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// One property of every light, concatenated in insertion order.
    pub fn get_array(&self, property: LightProperty) -> Vec<f32> {
        self.lights
            .iter()
            .flat_map(|light| match property {
                LightProperty::Position => {
                    vec![light.position.x, light.position.y, light.position.z]
                }
                LightProperty::Ambient => light.ambient.to_vec(),
                LightProperty::Diffuse => light.diffuse.to_vec(),
                LightProperty::Specular => light.specular.to_vec(),
            })
            .collect()
    }
}
