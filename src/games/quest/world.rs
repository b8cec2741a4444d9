//! Map data: tiles, exits and props for every map, loaded from JSON.
//!
//! Maps are written as rows of glyphs so they stay readable in the data
//! file. Loading validates every cross-reference once; afterwards the
//! tables are read-only and lookups treat a missing map as a bug.

use std::collections::HashMap;

use serde::Deserialize;

use super::config::GameConfig;
use super::error::WorldError;

const BUILTIN_WORLD: &str = include_str!("../../../assets/world.json");

// ── Grid primitives ───────────────────────────────────────────

/// Cardinal direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Delta (dx, dy) for this direction.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn reverse(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn turn_left(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn turn_right(&self) -> Direction {
        self.turn_left().reverse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring tile in `dir`. May lie outside any map.
    pub fn step(self, dir: Direction) -> TilePos {
        let (dx, dy) = dir.delta();
        TilePos::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Floor,
    Wall,
    Grass,
    Water,
    Sand,
}

impl Terrain {
    pub fn from_glyph(c: char) -> Option<Terrain> {
        match c {
            '.' => Some(Terrain::Floor),
            '#' => Some(Terrain::Wall),
            ',' => Some(Terrain::Grass),
            '~' => Some(Terrain::Water),
            ':' => Some(Terrain::Sand),
            _ => None,
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Terrain::Floor => '.',
            Terrain::Wall => '#',
            Terrain::Grass => '"',
            Terrain::Water => '~',
            Terrain::Sand => ':',
        }
    }

    /// Solid everywhere, regardless of the map's own rules.
    pub fn is_solid(&self) -> bool {
        matches!(self, Terrain::Wall)
    }
}

// ── Maps ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapId {
    House,
    Village,
    Valencia,
    Valladolid,
    Japan,
}

/// Inclusive tile rectangle that sends the actor to another map.
#[derive(Clone, Debug, Deserialize)]
pub struct ExitRegion {
    pub min: TilePos,
    pub max: TilePos,
    pub to: MapId,
    /// Arrival tile on the destination map before inset adjustment.
    pub spawn: TilePos,
}

impl ExitRegion {
    pub fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropKind {
    Package,
    Note,
    Villager { text: String },
    HeartKeeper,
    SwitchVault,
    VendingMachine,
    QuizMaster,
    /// Picked up by walking over it.
    Coin { id: u32 },
    /// Enemy standing guard; gone for good once defeated.
    Sentry { id: String },
}

impl PropKind {
    pub fn glyph(&self) -> char {
        match self {
            PropKind::Package => 'P',
            PropKind::Note => 'n',
            PropKind::Villager { .. } => 'v',
            PropKind::HeartKeeper => 'H',
            PropKind::SwitchVault => 'V',
            PropKind::VendingMachine => 'M',
            PropKind::QuizMaster => 'Q',
            PropKind::Coin { .. } => '$',
            PropKind::Sentry { .. } => 'S',
        }
    }

    /// Whether the prop occupies its tile. Coins are walked over.
    pub fn is_solid(&self) -> bool {
        !matches!(self, PropKind::Coin { .. })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Prop {
    pub at: TilePos,
    pub what: PropKind,
}

/// On-disk shape of a map.
#[derive(Deserialize)]
struct MapFile {
    id: MapId,
    name: String,
    rows: Vec<String>,
    spawn: TilePos,
    #[serde(default)]
    exits: Vec<ExitRegion>,
    #[serde(default)]
    forbidden: Vec<Terrain>,
    #[serde(default)]
    encounter_rate: f64,
    #[serde(default)]
    props: Vec<Prop>,
}

#[derive(Deserialize)]
struct WorldFile {
    #[serde(default)]
    config: GameConfig,
    start: MapId,
    maps: Vec<MapFile>,
}

#[derive(Clone, Debug)]
pub struct MapDef {
    pub id: MapId,
    pub name: String,
    pub width: usize,
    pub height: usize,
    tiles: Vec<Terrain>,
    pub spawn: TilePos,
    pub exits: Vec<ExitRegion>,
    /// Terrain the actor may not enter on this map.
    pub forbidden: Vec<Terrain>,
    /// Chance of a random battle per step that ends on grass.
    pub encounter_rate: f64,
    pub props: Vec<Prop>,
}

impl MapDef {
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn terrain(&self, pos: TilePos) -> Option<Terrain> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize * self.width + pos.x as usize])
    }

    pub fn is_forbidden(&self, terrain: Terrain) -> bool {
        self.forbidden.contains(&terrain)
    }

    /// In bounds, not solid and not forbidden here. Props are not considered.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        match self.terrain(pos) {
            Some(t) => !t.is_solid() && !self.is_forbidden(t),
            None => false,
        }
    }

    pub fn exit_at(&self, pos: TilePos) -> Option<&ExitRegion> {
        self.exits.iter().find(|e| e.contains(pos))
    }

    pub fn props_at(&self, pos: TilePos) -> impl Iterator<Item = &Prop> {
        self.props.iter().filter(move |p| p.at == pos)
    }

    fn from_file(file: MapFile) -> Result<MapDef, WorldError> {
        let height = file.rows.len();
        let width = file.rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(WorldError::EmptyMap(file.id));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in file.rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(WorldError::RaggedRow {
                    map: file.id,
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain = Terrain::from_glyph(glyph).ok_or(WorldError::UnknownGlyph {
                    map: file.id,
                    glyph,
                    x,
                    y,
                })?;
                tiles.push(terrain);
            }
        }

        let map = MapDef {
            id: file.id,
            name: file.name,
            width,
            height,
            tiles,
            spawn: file.spawn,
            exits: file.exits,
            forbidden: file.forbidden,
            encounter_rate: file.encounter_rate.clamp(0.0, 1.0),
            props: file.props,
        };

        map.check_inside("spawn", map.spawn)?;
        for exit in &map.exits {
            map.check_inside("exit corner", exit.min)?;
            map.check_inside("exit corner", exit.max)?;
        }
        for prop in &map.props {
            map.check_inside("prop", prop.at)?;
        }
        Ok(map)
    }

    fn check_inside(&self, what: &'static str, pos: TilePos) -> Result<(), WorldError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds {
                map: self.id,
                what,
                x: pos.x,
                y: pos.y,
            })
        }
    }
}

// ── World ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct World {
    pub config: GameConfig,
    pub start: MapId,
    maps: HashMap<MapId, MapDef>,
}

impl World {
    /// The world shipped with the game.
    pub fn builtin() -> Result<World, WorldError> {
        World::from_json(BUILTIN_WORLD)
    }

    pub fn from_json(json: &str) -> Result<World, WorldError> {
        let file: WorldFile = serde_json::from_str(json)?;

        let mut maps = HashMap::new();
        for map_file in file.maps {
            let map = MapDef::from_file(map_file)?;
            if maps.contains_key(&map.id) {
                return Err(WorldError::DuplicateMap(map.id));
            }
            maps.insert(map.id, map);
        }

        if !maps.contains_key(&file.start) {
            return Err(WorldError::MissingStart(file.start));
        }

        for map in maps.values() {
            for exit in &map.exits {
                let dest = maps.get(&exit.to).ok_or(WorldError::UnknownDestination {
                    map: map.id,
                    to: exit.to,
                })?;
                dest.check_inside("exit spawn", exit.spawn)?;
            }
        }

        tracing::info!(maps = maps.len(), start = ?file.start, "world loaded");
        Ok(World {
            config: file.config,
            start: file.start,
            maps,
        })
    }

    /// # Panics
    /// If `id` was not in the loaded file. Every exit destination and the
    /// start map are checked at load time, so only a hand-built id can miss.
    pub fn map(&self, id: MapId) -> &MapDef {
        &self.maps[&id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_world(rows: &str, extra_exit: &str) -> String {
        format!(
            r#"{{
                "start": "house",
                "maps": [
                    {{
                        "id": "house", "name": "House",
                        "rows": {rows},
                        "spawn": {{ "x": 1, "y": 1 }},
                        "exits": [{extra_exit}]
                    }}
                ]
            }}"#
        )
    }

    #[test]
    fn builtin_world_loads() {
        let world = World::builtin().unwrap();
        assert_eq!(world.start, MapId::House);
        for id in [MapId::House, MapId::Village, MapId::Valencia, MapId::Valladolid, MapId::Japan] {
            let map = world.map(id);
            assert!(map.is_walkable(map.spawn), "{:?} spawn must be walkable", id);
        }
        assert_eq!(world.config.battle.enemy_max_hp, 60);
    }

    #[test]
    fn builtin_exits_have_a_way_back() {
        let world = World::builtin().unwrap();
        for id in [MapId::House, MapId::Village, MapId::Valencia, MapId::Valladolid, MapId::Japan] {
            for exit in &world.map(id).exits {
                let dest = world.map(exit.to);
                assert!(
                    dest.exits.iter().any(|back| back.to == id),
                    "{:?} -> {:?} has no exit back",
                    id,
                    exit.to
                );
            }
        }
    }

    #[test]
    fn parses_terrain_and_props() {
        let world = World::builtin().unwrap();
        let house = world.map(MapId::House);
        assert_eq!(house.width, 10);
        assert_eq!(house.height, 8);
        assert_eq!(house.terrain(TilePos::new(0, 0)), Some(Terrain::Wall));
        assert_eq!(house.terrain(TilePos::new(4, 7)), Some(Terrain::Floor));
        assert_eq!(house.terrain(TilePos::new(-1, 0)), None);
        assert!(house
            .props_at(TilePos::new(4, 2))
            .any(|p| p.what == PropKind::Package));
    }

    #[test]
    fn exit_region_is_inclusive() {
        let exit = ExitRegion {
            min: TilePos::new(4, 7),
            max: TilePos::new(5, 7),
            to: MapId::Village,
            spawn: TilePos::new(8, 5),
        };
        assert!(exit.contains(TilePos::new(4, 7)));
        assert!(exit.contains(TilePos::new(5, 7)));
        assert!(!exit.contains(TilePos::new(6, 7)));
        assert!(!exit.contains(TilePos::new(4, 6)));
    }

    #[test]
    fn forbidden_terrain_is_not_walkable() {
        let world = World::builtin().unwrap();
        let village = world.map(MapId::Village);
        let japan = world.map(MapId::Japan);
        assert!(!village.is_walkable(TilePos::new(9, 2)));
        assert!(japan.is_walkable(TilePos::new(3, 2)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let json = tiny_world(r####"["###", "#.", "###"]"####, "");
        assert!(matches!(
            World::from_json(&json),
            Err(WorldError::RaggedRow { row: 1, expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn rejects_unknown_glyph() {
        let json = tiny_world(r####"["###", "#?#", "###"]"####, "");
        assert!(matches!(
            World::from_json(&json),
            Err(WorldError::UnknownGlyph { glyph: '?', x: 1, y: 1, .. })
        ));
    }

    #[test]
    fn rejects_exit_to_missing_map() {
        let json = tiny_world(
            r####"["###", "#.#", "###"]"####,
            r#"{ "min": { "x": 1, "y": 1 }, "max": { "x": 1, "y": 1 }, "to": "japan", "spawn": { "x": 0, "y": 0 } }"#,
        );
        assert!(matches!(
            World::from_json(&json),
            Err(WorldError::UnknownDestination { to: MapId::Japan, .. })
        ));
    }

    #[test]
    fn rejects_spawn_outside_map() {
        let json = r#"{
            "start": "house",
            "maps": [{ "id": "house", "name": "H", "rows": ["..", ".."], "spawn": { "x": 5, "y": 0 } }]
        }"#;
        assert!(matches!(
            World::from_json(json),
            Err(WorldError::OutOfBounds { what: "spawn", x: 5, .. })
        ));
    }

    #[test]
    fn rejects_missing_start_and_bad_json() {
        let json = r#"{ "start": "japan", "maps": [{ "id": "house", "name": "H", "rows": ["."], "spawn": { "x": 0, "y": 0 } }] }"#;
        assert!(matches!(World::from_json(json), Err(WorldError::MissingStart(MapId::Japan))));
        assert!(matches!(World::from_json("{"), Err(WorldError::Parse(_))));
    }

    #[test]
    fn direction_turns() {
        assert_eq!(Direction::Up.turn_left(), Direction::Left);
        assert_eq!(Direction::Up.turn_right(), Direction::Right);
        assert_eq!(Direction::Left.reverse(), Direction::Right);
        assert_eq!(TilePos::new(2, 2).step(Direction::Up), TilePos::new(2, 1));
    }
}
