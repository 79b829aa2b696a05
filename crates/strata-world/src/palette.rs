use strata_core::SmallKeyHashMap;

use std::ops::Index;

/// An identifier for one of the materials in a given [`MaterialPalette`].
pub type PaletteId16 = u16;

/// The code every palette reserves for the default/void material.
pub const VOID_ID: PaletteId16 = 0;

/// An append-only, insertion-ordered mapping from material identifier to [`PaletteId16`].
///
/// The first registered material is the void/default material, so it always holds code 0. Once a
/// material is registered its code never changes for the lifetime of the palette; re-registering
/// is a no-op. Lookup is O(1) in both directions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MaterialPalette {
    materials: Vec<String>,
    ids: SmallKeyHashMap<String, PaletteId16>,
}

impl MaterialPalette {
    pub fn new(void_material: impl Into<String>) -> Self {
        let mut palette = Self {
            materials: Vec::new(),
            ids: SmallKeyHashMap::default(),
        };
        palette.get_or_insert(&void_material.into());
        palette
    }

    /// The code for `material`, registering it with the next free code if it is new.
    pub fn get_or_insert(&mut self, material: &str) -> PaletteId16 {
        if let Some(&id) = self.ids.get(material) {
            return id;
        }
        let id = self.materials.len() as PaletteId16;
        self.materials.push(material.to_owned());
        self.ids.insert(material.to_owned(), id);
        id
    }

    pub fn id_of(&self, material: &str) -> Option<PaletteId16> {
        self.ids.get(material).copied()
    }

    pub fn void_material(&self) -> &str {
        &self.materials[VOID_ID as usize]
    }

    /// All registered materials, in registration order. Positions are the codes.
    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Index<PaletteId16> for MaterialPalette {
    type Output = str;

    /// Panics on an unregistered code. A consumer holding a code the palette does not know is an
    /// internal-invariant violation, not a runtime condition.
    #[inline]
    fn index(&self, id: PaletteId16) -> &Self::Output {
        &self.materials[id as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn void_gets_code_zero() {
        let palette = MaterialPalette::new("meta:void");
        assert_eq!(palette.id_of("meta:void"), Some(VOID_ID));
        assert_eq!(palette.void_material(), "meta:void");
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn codes_are_stable_and_append_only() {
        let mut palette = MaterialPalette::new("meta:void");
        let stone = palette.get_or_insert("minecraft:stone");
        let dirt = palette.get_or_insert("minecraft:dirt");
        assert_eq!((stone, dirt), (1, 2));

        // Re-registration must not move anything.
        assert_eq!(palette.get_or_insert("minecraft:stone"), stone);
        assert_eq!(palette.get_or_insert("minecraft:dirt"), dirt);
        assert_eq!(
            palette.materials(),
            &["meta:void", "minecraft:stone", "minecraft:dirt"]
        );
        assert_eq!(&palette[stone], "minecraft:stone");
    }

    #[test]
    fn identical_registration_order_gives_identical_palettes() {
        let build = || {
            let mut p = MaterialPalette::new("meta:void");
            for m in ["minecraft:stone", "minecraft:glass", "minecraft:stone"] {
                p.get_or_insert(m);
            }
            p
        };
        assert_eq!(build(), build());
    }
}
