use crate::error::SolveError;
use crate::geometry::Pos;
use crate::vec2d::Vec2d;

/// The typed input to level compilation: a rectangular grid of wall/box/goal/
/// sink flags plus a single agent position. Produced either by hand or by
/// `parse_level`.
pub struct LevelEnv {
    pub wall: Vec2d<bool>,
    pub box_: Vec2d<bool>,
    pub goal: Vec2d<bool>,
    pub sink: Vec2d<bool>,
    pub agent: Pos,
}

impl LevelEnv {
    pub fn new(
        wall: Vec2d<bool>,
        box_: Vec2d<bool>,
        goal: Vec2d<bool>,
        sink: Vec2d<bool>,
        agent: Pos,
    ) -> Self {
        LevelEnv {
            wall,
            box_,
            goal,
            sink,
            agent,
        }
    }

    crate fn rows(&self) -> usize {
        self.wall.rows()
    }

    crate fn cols(&self) -> usize {
        self.wall.cols()
    }

    /// Cheap shape/agent checks that don't require building the cell graph.
    /// `Level::compile` calls this before doing any real work.
    crate fn validate(&self) -> Result<(), SolveError> {
        let shape = (self.wall.rows(), self.wall.cols());
        let same_shape = [&self.box_, &self.goal, &self.sink]
            .iter()
            .all(|g| (g.rows(), g.cols()) == shape);
        if !same_shape {
            return Err(SolveError::MismatchedShape);
        }
        if !self.wall.in_bounds(self.agent.row as isize, self.agent.col as isize)
            || self.wall[(self.agent.row, self.agent.col)]
        {
            return Err(SolveError::NoAgent);
        }
        if self.box_[(self.agent.row, self.agent.col)] {
            return Err(SolveError::AgentOnBox);
        }
        let boxes = self.box_.iter().filter(|(_, &b)| b).count();
        let goals = self.goal.iter().filter(|(_, &g)| g).count();
        if boxes == 0 {
            return Err(SolveError::NoBoxes);
        }
        if boxes != goals {
            return Err(SolveError::BoxGoalMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(rows: usize, cols: usize, set: &[(usize, usize)]) -> Vec2d<bool> {
        let mut grid = Vec2d::filled(rows, cols, false);
        for &(r, c) in set {
            grid[(r, c)] = true;
        }
        grid
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let env = LevelEnv::new(
            Vec2d::filled(2, 2, false),
            Vec2d::filled(2, 3, false),
            Vec2d::filled(2, 2, false),
            Vec2d::filled(2, 2, false),
            Pos::new(0, 0),
        );
        assert_eq!(env.validate(), Err(SolveError::MismatchedShape));
    }

    #[test]
    fn rejects_agent_on_box() {
        let env = LevelEnv::new(
            flags(2, 2, &[]),
            flags(2, 2, &[(0, 0), (1, 1)]),
            flags(2, 2, &[(0, 1), (1, 0)]),
            flags(2, 2, &[]),
            Pos::new(0, 0),
        );
        assert_eq!(env.validate(), Err(SolveError::AgentOnBox));
    }

    #[test]
    fn rejects_box_goal_mismatch() {
        let env = LevelEnv::new(
            flags(2, 2, &[]),
            flags(2, 2, &[(0, 0)]),
            flags(2, 2, &[(0, 1), (1, 0)]),
            flags(2, 2, &[]),
            Pos::new(1, 1),
        );
        assert_eq!(env.validate(), Err(SolveError::BoxGoalMismatch));
    }

    #[test]
    fn accepts_well_formed_env() {
        let env = LevelEnv::new(
            flags(2, 2, &[]),
            flags(2, 2, &[(0, 0)]),
            flags(2, 2, &[(0, 1)]),
            flags(2, 2, &[]),
            Pos::new(1, 1),
        );
        assert_eq!(env.validate(), Ok(()));
    }
}
