use crate::error::ParseError;
use crate::geometry::Pos;
use crate::level_env::LevelEnv;
use crate::vec2d::Vec2d;

/// Parses (a subset of) the format described
/// [here](http://www.sokobano.de/wiki/index.php?title=Level_format).
///
/// Never touches the filesystem - splitting a multi-level document and
/// picking one level out of it by a `:N` suffix is a front-end's job, not
/// this crate's.
pub fn parse_level(text: &str) -> Result<LevelEnv, ParseError> {
    let text = text.trim_matches('\n');

    let mut wall = Vec::new();
    let mut box_ = Vec::new();
    let mut goal = Vec::new();
    let mut agent = None;

    for (row, line) in text.lines().enumerate() {
        let mut wall_row = Vec::new();
        let mut box_row = Vec::new();
        let mut goal_row = Vec::new();

        for (col, ch) in line.chars().enumerate() {
            let (is_wall, is_box, is_goal) = match ch {
                '#' => (true, false, false),
                '@' => {
                    set_agent(&mut agent, row, col)?;
                    (false, false, false)
                }
                '+' => {
                    set_agent(&mut agent, row, col)?;
                    (false, false, true)
                }
                '$' => (false, true, false),
                '*' => (false, true, true),
                '.' => (false, false, true),
                ' ' | '-' | '_' => (false, false, false),
                _ => return Err(ParseError::BadChar(row, col)),
            };
            wall_row.push(is_wall);
            box_row.push(is_box);
            goal_row.push(is_goal);
        }

        wall.push(wall_row);
        box_.push(box_row);
        goal.push(goal_row);
    }

    let agent = agent.ok_or(ParseError::NoAgent)?;
    let wall = Vec2d::new(&wall);
    let box_ = Vec2d::new(&box_);
    let goal = Vec2d::new(&goal);
    let sink = wall.scratchpad();

    Ok(LevelEnv::new(wall, box_, goal, sink, agent))
}

fn set_agent(agent: &mut Option<Pos>, row: usize, col: usize) -> Result<(), ParseError> {
    if agent.is_some() {
        return Err(ParseError::MultipleAgents);
    }
    *agent = Some(Pos::new(row, col));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_no_agent() {
        let level = "#####\n#  .#\n#####";
        assert_eq!(parse_level(level), Err(ParseError::NoAgent));
    }

    #[test]
    fn rejects_two_agents() {
        let level = "#####\n#@$@#\n#####";
        assert_eq!(parse_level(level), Err(ParseError::MultipleAgents));
    }

    #[test]
    fn rejects_unknown_char() {
        let level = "#####\n#@X.#\n#####";
        assert_eq!(parse_level(level), Err(ParseError::BadChar(1, 2)));
    }

    #[test]
    fn parses_trivial_level() {
        let level = "#####\n#@$.#\n#####";
        let env = parse_level(level).unwrap();
        assert!(env.validate().is_ok());
        assert_eq!(env.agent, Pos::new(1, 1));
    }

    #[test]
    fn agent_on_goal_and_box_on_goal() {
        let level = "#####\n#+*$#\n#####";
        // agent-on-goal, box-on-goal, plain box: 2 boxes, but only one goal
        let env = parse_level(level).unwrap();
        assert_eq!(env.validate(), Err(crate::error::SolveError::BoxGoalMismatch));
    }

    #[test]
    fn pads_ragged_lines() {
        let level = "#####\n#@$.\n#####";
        let env = parse_level(level).unwrap();
        assert_eq!(env.cols(), 5);
    }
}
