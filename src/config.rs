use std::time::Duration;

use crate::error::ConfigError;

// 名前を指定しなかったときに座る顔ぶれ
pub const MUSICIANS: [&str; 5] = ["Beethoven", "Tchaikovsky", "Mozart", "Ferdinand", "Chopin"];

/// 食卓の設定
///
/// 負の時間やサイクル数は型で表現できないので、ここで検査するのは人数と名前の数だけ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub actors: usize,
    pub cycles: usize,
    pub eating: Duration,
    pub idle: Duration,
    pub jitter: Duration,
    pub names: Vec<String>, // 空なら番号で呼ぶ
}

impl Default for Config {
    fn default() -> Self {
        Config {
            actors: 5,
            cycles: 3,
            eating: Duration::from_secs(2),
            idle: Duration::from_millis(10),
            jitter: Duration::ZERO,
            names: Vec::new(),
        }
    }
}

impl Config {
    pub fn new(actors: usize, cycles: usize, eating: Duration) -> Self {
        Config {
            actors,
            cycles,
            eating,
            ..Default::default()
        }
    }

    pub fn idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    // 名前が空で、人数が足りるなら音楽家を座らせる
    pub fn cast(mut self) -> Self {
        if self.names.is_empty() && self.actors <= MUSICIANS.len() {
            self.names = MUSICIANS[..self.actors].iter().map(|n| n.to_string()).collect();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1 人だと left == right になってしまう
        if self.actors < 2 {
            return Err(ConfigError::TooFewActors {
                actors: self.actors,
            });
        }

        if !self.names.is_empty() && self.names.len() != self.actors {
            return Err(ConfigError::NameCountMismatch {
                expected: self.actors,
                got: self.names.len(),
            });
        }

        Ok(())
    }

    pub fn name(&self, i: usize) -> Option<&str> {
        self.names.get(i).map(String::as_str)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert_eq!(config.actors, 5);
        assert_eq!(config.cycles, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_too_few_actors() {
        for n in [0, 1] {
            let config = Config::new(n, 1, Duration::ZERO);
            assert_eq!(
                config.validate(),
                Err(ConfigError::TooFewActors { actors: n })
            );
        }
        assert!(Config::new(2, 0, Duration::ZERO).validate().is_ok());
    }

    #[test]
    fn test_names() {
        let config = Config::new(3, 1, Duration::ZERO).names(["Mozart", "Chopin"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NameCountMismatch {
                expected: 3,
                got: 2
            })
        );

        let config = config.names(["Mozart", "Chopin", "Beethoven"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.name(2), Some("Beethoven"));
        assert_eq!(config.name(3), None);
    }

    #[test]
    fn test_cast() {
        let config = Config::default().cast();
        assert_eq!(config.names, MUSICIANS.to_vec());
        assert!(config.validate().is_ok());

        let config = Config::new(2, 1, Duration::ZERO).cast();
        assert_eq!(config.names, vec!["Beethoven", "Tchaikovsky"]);

        // 足りなければ番号のまま
        let config = Config::new(7, 1, Duration::ZERO).cast();
        assert!(config.names.is_empty());
        assert!(config.validate().is_ok());

        // 指定済みの名前は上書きしない
        let config = Config::new(2, 1, Duration::ZERO).names(["a", "b"]).cast();
        assert_eq!(config.name(0), Some("a"));
    }
}
