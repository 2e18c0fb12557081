use serde::{Deserialize, Serialize};

/// Surface properties of a scene object.
///
/// Both the descriptive names (`diffuse`, `ambient`, ...) and the OBJ/MTL names
/// (`Kd`, `Ka`, ...) are kept so shaders written against either convention work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 4],
    pub kd: [f32; 3],
    pub ambient: [f32; 4],
    pub ka: [f32; 3],
    pub specular: [f32; 4],
    pub ks: [f32; 3],
    pub specular_exponent: f32,
    pub ns: f32,
    pub ni: Option<f32>,
    pub d: f32,
    pub transparency: f32,
    pub illum: u8,
}

impl Default for Material {
    fn default() -> Self {
        MaterialDesc::default().fill()
    }
}

impl Material {
    /// Replaces every field the description sets.
    pub fn apply(&mut self, desc: &MaterialDesc) {
        if let Some(diffuse) = desc.diffuse {
            self.diffuse = diffuse;
        }
        if let Some(kd) = desc.kd {
            self.kd = kd;
        }
        if let Some(ambient) = desc.ambient {
            self.ambient = ambient;
        }
        if let Some(ka) = desc.ka {
            self.ka = ka;
        }
        if let Some(specular) = desc.specular {
            self.specular = specular;
        }
        if let Some(ks) = desc.ks {
            self.ks = ks;
        }
        if let Some(specular_exponent) = desc.specular_exponent {
            self.specular_exponent = specular_exponent;
        }
        if let Some(ns) = desc.ns {
            self.ns = ns;
        }
        if desc.ni.is_some() {
            self.ni = desc.ni;
        }
        if let Some(d) = desc.d {
            self.d = d;
        }
        if let Some(transparency) = desc.transparency {
            self.transparency = transparency;
        }
        if let Some(illum) = desc.illum {
            self.illum = illum;
        }
    }
}

/// A partially specified material, as found in geometry files and overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDesc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffuse: Option<[f32; 4]>,
    #[serde(default, rename = "Kd", skip_serializing_if = "Option::is_none")]
    pub kd: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient: Option<[f32; 4]>,
    #[serde(default, rename = "Ka", skip_serializing_if = "Option::is_none")]
    pub ka: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<[f32; 4]>,
    #[serde(default, rename = "Ks", skip_serializing_if = "Option::is_none")]
    pub ks: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular_exponent: Option<f32>,
    #[serde(default, rename = "Ns", skip_serializing_if = "Option::is_none")]
    pub ns: Option<f32>,
    #[serde(default, rename = "Ni", skip_serializing_if = "Option::is_none")]
    pub ni: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illum: Option<u8>,
}

impl MaterialDesc {
    /// Completes the description with defaults for every absent field.
    ///
    /// OBJ names fall back to their descriptive counterparts, so `Kd` defaults to the
    /// RGB part of `diffuse` and `transparency` to `d`.
    pub fn fill(&self) -> Material {
        let diffuse = self.diffuse.unwrap_or([1.0, 1.0, 1.0, 1.0]);
        let ambient = self.ambient.unwrap_or([0.2, 0.2, 0.2, 1.0]);
        let specular = self.specular.unwrap_or([1.0, 1.0, 1.0, 1.0]);
        let specular_exponent = self.specular_exponent.unwrap_or(0.0);
        let d = self.d.unwrap_or(1.0);

        Material {
            diffuse,
            kd: self.kd.unwrap_or([diffuse[0], diffuse[1], diffuse[2]]),
            ambient,
            ka: self.ka.unwrap_or([ambient[0], ambient[1], ambient[2]]),
            specular,
            ks: self.ks.unwrap_or([specular[0], specular[1], specular[2]]),
            specular_exponent,
            ns: self.ns.unwrap_or(specular_exponent),
            ni: self.ni,
            d,
            transparency: self.transparency.unwrap_or(d),
            illum: self.illum.unwrap_or(1),
        }
    }

    /// Maps an MTL material onto the OBJ-named fields.
    pub fn from_mtl(mtl: &tobj::Material) -> Self {
        let diffuse = mtl
            .diffuse
            .map(|kd| [kd[0], kd[1], kd[2], mtl.dissolve.unwrap_or(1.0)]);

        Self {
            diffuse,
            kd: mtl.diffuse,
            ambient: mtl.ambient.map(|ka| [ka[0], ka[1], ka[2], 1.0]),
            ka: mtl.ambient,
            specular: mtl.specular.map(|ks| [ks[0], ks[1], ks[2], 1.0]),
            ks: mtl.specular,
            specular_exponent: mtl.shininess,
            ns: mtl.shininess,
            ni: mtl.optical_density,
            d: mtl.dissolve,
            transparency: None,
            illum: mtl.illumination_model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fill() {
        let material = MaterialDesc::default().fill();
        assert_eq!(material.diffuse, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.kd, [1.0, 1.0, 1.0]);
        assert_eq!(material.ambient, [0.2, 0.2, 0.2, 1.0]);
        assert_eq!(material.ka, [0.2, 0.2, 0.2]);
        assert_eq!(material.specular, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.ks, [1.0, 1.0, 1.0]);
        assert_eq!(material.specular_exponent, 0.0);
        assert_eq!(material.ns, 0.0);
        assert_eq!(material.d, 1.0);
        assert_eq!(material.transparency, 1.0);
        assert_eq!(material.illum, 1);
        assert_eq!(material.ni, None);
    }

    #[test]
    fn test_obj_names_follow_descriptive_names() {
        let desc = MaterialDesc {
            diffuse: Some([0.5, 0.25, 0.125, 1.0]),
            specular_exponent: Some(12.0),
            d: Some(0.4),
            ..Default::default()
        };
        let material = desc.fill();
        assert_eq!(material.kd, [0.5, 0.25, 0.125]);
        assert_eq!(material.ns, 12.0);
        assert_eq!(material.transparency, 0.4);
    }

    #[test]
    fn test_present_fields_are_kept() {
        let desc = MaterialDesc {
            kd: Some([0.1, 0.2, 0.3]),
            illum: Some(2),
            ..Default::default()
        };
        let material = desc.fill();
        assert_eq!(material.diffuse, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.kd, [0.1, 0.2, 0.3]);
        assert_eq!(material.illum, 2);
    }

    #[test]
    fn test_apply_overrides_after_fill() {
        let mut material = MaterialDesc::default().fill();
        material.apply(&MaterialDesc {
            diffuse: Some([0.0, 1.0, 0.0, 1.0]),
            ..Default::default()
        });
        assert_eq!(material.diffuse, [0.0, 1.0, 0.0, 1.0]);
        // Kd was filled before the override
        assert_eq!(material.kd, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_parse_mixed_naming() {
        let desc: MaterialDesc = serde_json::from_str(
            r#"{"diffuse":[1,0,0,1],"Ka":[0.1,0.1,0.1],"specularExponent":8,"Ni":1.5}"#,
        )
        .unwrap();
        assert_eq!(desc.diffuse, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(desc.ka, Some([0.1, 0.1, 0.1]));
        assert_eq!(desc.specular_exponent, Some(8.0));
        assert_eq!(desc.ni, Some(1.5));
    }
}
