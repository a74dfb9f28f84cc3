// Per-tick systems, run in declaration order by the simulation.

pub mod npc;
pub mod players;
pub mod population;
pub mod projectiles;
