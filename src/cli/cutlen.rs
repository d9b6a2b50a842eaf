use std::fmt;

/// Flank lengths to try: one value, or from..=to in steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutlenSweep {
    Single(usize),
    Range { from: usize, to: usize, step: usize },
}

impl CutlenSweep {
    pub fn new(
        cutlen: usize,
        from: Option<usize>,
        to: Option<usize>,
        step: usize,
    ) -> anyhow::Result<Self> {
        match (from, to) {
            (None, None) => {
                if cutlen == 0 {
                    Err(anyhow!("cutlen must be positive"))
                } else {
                    Ok(Self::Single(cutlen))
                }
            }
            (Some(from), Some(to)) => {
                if from == 0 {
                    Err(anyhow!("cutlen-from must be positive"))
                } else if from > to {
                    Err(anyhow!(
                        "cutlen-from ({}) is greater than cutlen-to ({})",
                        from,
                        to
                    ))
                } else if step == 0 {
                    Err(anyhow!("cut-step must be positive"))
                } else {
                    Ok(Self::Range { from, to, step })
                }
            }
            _ => Err(anyhow!(
                "cutlen-from and cutlen-to must be given together"
            )),
        }
    }

    pub fn values(&self) -> Vec<usize> {
        match self {
            Self::Single(c) => vec![*c],
            Self::Range { from, to, step } => (*from..=*to).step_by(*step).collect(),
        }
    }
}

impl fmt::Display for CutlenSweep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Single(c) => write!(f, "{}", c),
            Self::Range { from, to, step } => write!(f, "{}..={} step {}", from, to, step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn single_value() {
        let s = CutlenSweep::new(5000, None, None, 50).unwrap();
        assert_eq!(s.values(), vec![5000]);
    }

    #[rstest]
    #[case(100, 300, 100, vec![100, 200, 300])]
    #[case(100, 250, 100, vec![100, 200])]
    #[case(70, 70, 50, vec![70])]
    fn range_is_inclusive(
        #[case] from: usize,
        #[case] to: usize,
        #[case] step: usize,
        #[case] expected: Vec<usize>,
    ) {
        let s = CutlenSweep::new(5000, Some(from), Some(to), step).unwrap();
        assert_eq!(s.values(), expected);
    }

    #[rstest]
    #[case(0, None, None, 50)]
    #[case(5000, Some(300), Some(200), 50)]
    #[case(5000, Some(100), Some(200), 0)]
    #[case(5000, Some(100), None, 50)]
    #[case(5000, None, Some(100), 50)]
    #[case(5000, Some(0), Some(100), 50)]
    fn invalid(
        #[case] cutlen: usize,
        #[case] from: Option<usize>,
        #[case] to: Option<usize>,
        #[case] step: usize,
    ) {
        assert!(CutlenSweep::new(cutlen, from, to, step).is_err());
    }
}
