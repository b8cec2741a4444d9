//! Tile movement and exit lookup.
//!
//! A committed step cannot be interrupted or queued behind: while it is in
//! flight every new request is refused. Arrival is reported once from
//! [`Navigator::advance`].

use super::world::{Direction, MapDef, MapId, TilePos, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Started,
    /// A step is already in flight.
    Busy,
    OutOfBounds,
    /// Solid terrain or an occupied tile.
    Blocked,
    /// Terrain this map does not allow.
    Forbidden,
}

#[derive(Clone, Copy, Debug)]
struct Motion {
    from: TilePos,
    elapsed_ms: u32,
}

#[derive(Clone, Debug)]
pub struct Navigator {
    tile: TilePos,
    facing: Direction,
    motion: Option<Motion>,
    move_ms: u32,
}

impl Navigator {
    pub fn new(tile: TilePos, facing: Direction, move_ms: u32) -> Self {
        Self {
            tile,
            facing,
            motion: None,
            move_ms: move_ms.max(1),
        }
    }

    /// Logical tile. During a step this is already the destination.
    pub fn tile(&self) -> TilePos {
        self.tile
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// `(from, fraction)` of the step in flight, for interpolated drawing.
    pub fn move_progress(&self) -> Option<(TilePos, f32)> {
        self.motion
            .map(|m| (m.from, m.elapsed_ms as f32 / self.move_ms as f32))
    }

    /// Tile to draw the actor on: the origin for the first half of a step.
    pub fn display_tile(&self) -> TilePos {
        match self.move_progress() {
            Some((from, p)) if p < 0.5 => from,
            _ => self.tile,
        }
    }

    /// Teleport, cancelling any step in flight. Used on map loads.
    pub fn place(&mut self, tile: TilePos, facing: Direction) {
        self.tile = tile;
        self.facing = facing;
        self.motion = None;
    }

    /// Face `dir` and try to start a step. `occupied` reports tiles taken
    /// by props on the current map.
    pub fn try_move(
        &mut self,
        dir: Direction,
        map: &MapDef,
        occupied: impl Fn(TilePos) -> bool,
    ) -> MoveResult {
        if self.is_moving() {
            return MoveResult::Busy;
        }
        self.facing = dir;

        let target = self.tile.step(dir);
        let terrain = match map.terrain(target) {
            Some(t) => t,
            None => return MoveResult::OutOfBounds,
        };
        if terrain.is_solid() || occupied(target) {
            return MoveResult::Blocked;
        }
        if map.is_forbidden(terrain) {
            return MoveResult::Forbidden;
        }

        self.motion = Some(Motion {
            from: self.tile,
            elapsed_ms: 0,
        });
        self.tile = target;
        MoveResult::Started
    }

    /// Progress the step in flight. Returns the arrival tile exactly once.
    pub fn advance(&mut self, elapsed_ms: u32) -> Option<TilePos> {
        let motion = self.motion.as_mut()?;
        motion.elapsed_ms = motion.elapsed_ms.saturating_add(elapsed_ms);
        if motion.elapsed_ms < self.move_ms {
            return None;
        }
        self.motion = None;
        Some(self.tile)
    }
}

/// Where an exit leads, with the arrival tile already inset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub to: MapId,
    pub spawn: TilePos,
    pub facing: Direction,
}

/// Look up the exit covering `tile` on `map`. `dir` is the direction the
/// actor was travelling when it arrived.
pub fn check_exit(world: &World, map: &MapDef, tile: TilePos, dir: Direction) -> Option<Transition> {
    let exit = map.exit_at(tile)?;
    let dest = world.map(exit.to);
    Some(Transition {
        to: exit.to,
        spawn: inset_spawn(dest, exit.spawn, dir),
        facing: dir,
    })
}

/// Move an arrival tile off the destination's exits, one tile along the
/// direction of travel when possible, so the actor never lands on the way
/// straight back.
pub fn inset_spawn(dest: &MapDef, spawn: TilePos, dir: Direction) -> TilePos {
    if dest.exit_at(spawn).is_none() {
        return spawn;
    }
    [dir, dir.turn_left(), dir.turn_right(), dir.reverse()]
        .into_iter()
        .map(|d| spawn.step(d))
        .find(|&c| dest.is_walkable(c) && dest.exit_at(c).is_none())
        .unwrap_or(spawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::quest::world::World;

    fn world() -> World {
        World::builtin().unwrap()
    }

    fn nav_at(x: i32, y: i32) -> Navigator {
        Navigator::new(TilePos::new(x, y), Direction::Down, 150)
    }

    #[test]
    fn step_completes_after_move_duration() {
        let w = world();
        let house = w.map(MapId::House);
        let mut nav = nav_at(4, 5);
        assert_eq!(nav.try_move(Direction::Left, house, |_| false), MoveResult::Started);
        assert!(nav.is_moving());
        assert_eq!(nav.display_tile(), TilePos::new(4, 5));
        assert_eq!(nav.advance(100), None);
        assert_eq!(nav.display_tile(), TilePos::new(3, 5));
        assert_eq!(nav.advance(50), Some(TilePos::new(3, 5)));
        assert!(!nav.is_moving());
        assert_eq!(nav.advance(1000), None);
    }

    #[test]
    fn no_new_step_while_moving() {
        let w = world();
        let house = w.map(MapId::House);
        let mut nav = nav_at(4, 5);
        nav.try_move(Direction::Left, house, |_| false);
        assert_eq!(nav.try_move(Direction::Up, house, |_| false), MoveResult::Busy);
        assert_eq!(nav.tile(), TilePos::new(3, 5));
        assert_eq!(nav.facing(), Direction::Left);
    }

    #[test]
    fn solid_tile_rejects_and_keeps_position() {
        let w = world();
        let house = w.map(MapId::House);
        let mut nav = nav_at(1, 1);
        assert_eq!(nav.try_move(Direction::Up, house, |_| false), MoveResult::Blocked);
        assert_eq!(nav.tile(), TilePos::new(1, 1));
        assert!(!nav.is_moving());
        // Facing still turns toward the wall.
        assert_eq!(nav.facing(), Direction::Up);
    }

    #[test]
    fn occupied_tile_rejects() {
        let w = world();
        let house = w.map(MapId::House);
        let mut nav = nav_at(4, 3);
        let blocked = TilePos::new(4, 2);
        assert_eq!(
            nav.try_move(Direction::Up, house, |t| t == blocked),
            MoveResult::Blocked
        );
        assert_eq!(nav.tile(), TilePos::new(4, 3));
    }

    #[test]
    fn out_of_bounds_rejects() {
        let w = world();
        let village = w.map(MapId::Village);
        let mut nav = nav_at(0, 3);
        assert_eq!(nav.try_move(Direction::Left, village, |_| false), MoveResult::OutOfBounds);
        assert_eq!(nav.tile(), TilePos::new(0, 3));
    }

    #[test]
    fn forbidden_terrain_rejects() {
        let w = world();
        let village = w.map(MapId::Village);
        // (9, 2) is water, forbidden in the village.
        let mut nav = nav_at(9, 3);
        assert_eq!(nav.try_move(Direction::Up, village, |_| false), MoveResult::Forbidden);
        assert_eq!(nav.tile(), TilePos::new(9, 3));

        // Japan lets you wade.
        let japan = w.map(MapId::Japan);
        let mut nav = nav_at(3, 1);
        assert_eq!(nav.try_move(Direction::Down, japan, |_| false), MoveResult::Started);
    }

    #[test]
    fn village_door_lands_inset_from_house_exit() {
        let w = world();
        let village = w.map(MapId::Village);
        let t = check_exit(&w, village, TilePos::new(8, 5), Direction::Up).unwrap();
        assert_eq!(t.to, MapId::House);
        let house = w.map(MapId::House);
        assert!(house.exit_at(t.spawn).is_none());
        assert_eq!(t.spawn, TilePos::new(4, 6));
    }

    #[test]
    fn every_builtin_exit_lands_off_the_reverse_exit() {
        let w = world();
        for id in [MapId::House, MapId::Village, MapId::Valencia, MapId::Valladolid, MapId::Japan] {
            let map = w.map(id);
            for exit in &map.exits {
                for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
                    let t = check_exit(&w, map, exit.min, dir).unwrap();
                    let dest = w.map(t.to);
                    assert!(dest.exit_at(t.spawn).is_none(), "{:?} -> {:?} {:?}", id, t.to, dir);
                    assert!(dest.is_walkable(t.spawn));
                }
            }
        }
    }

    #[test]
    fn house_exit_lands_below_village_door() {
        let w = world();
        let house = w.map(MapId::House);
        let t = check_exit(&w, house, TilePos::new(4, 7), Direction::Down).unwrap();
        assert_eq!(t.to, MapId::Village);
        assert_eq!(t.spawn, TilePos::new(8, 6));
    }

    #[test]
    fn no_exit_on_plain_tile() {
        let w = world();
        let house = w.map(MapId::House);
        assert!(check_exit(&w, house, TilePos::new(4, 5), Direction::Down).is_none());
    }
}
