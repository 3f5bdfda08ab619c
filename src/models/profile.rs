use super::types::Graphic;

/// Item identities a harvesting run works with.
///
/// The profile names the tools that can be used on a harvest source, the raw
/// material the source yields, and the denser form the raw material is
/// converted into when the avatar runs low on carrying capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestProfile {
    /// Human-readable tool name used in status messages (e.g. "axe")
    pub tool_name: &'static str,

    /// Art ids accepted as a harvesting tool
    pub tool_graphics: Vec<Graphic>,

    /// Raw material yielded by a harvest source
    pub raw_graphic: Graphic,

    /// Converted, lighter material produced from the raw one
    pub converted_graphic: Graphic,
}

impl HarvestProfile {
    pub const BATTLE_AXE: Graphic = 0x0F47;
    pub const AXE: Graphic = 0x0F49;
    pub const LARGE_BATTLE_AXE: Graphic = 0x13FB;
    pub const HALBERD: Graphic = 0x143E;
    pub const LOGS: Graphic = 0x1BDD;
    pub const BOARDS: Graphic = 0x1BD7;

    /// Lumberjacking: axes on trees, logs cut into boards.
    pub fn lumber() -> Self {
        Self {
            tool_name: "axe",
            tool_graphics: vec![
                Self::BATTLE_AXE,
                Self::AXE,
                Self::LARGE_BATTLE_AXE,
                Self::HALBERD,
            ],
            raw_graphic: Self::LOGS,
            converted_graphic: Self::BOARDS,
        }
    }

    pub fn is_tool(&self, graphic: Graphic) -> bool {
        self.tool_graphics.contains(&graphic)
    }

    /// Raw or converted material; everything that gets unloaded at home.
    pub fn is_material(&self, graphic: Graphic) -> bool {
        graphic == self.raw_graphic || graphic == self.converted_graphic
    }
}

impl Default for HarvestProfile {
    fn default() -> Self {
        Self::lumber()
    }
}
