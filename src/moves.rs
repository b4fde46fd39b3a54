use serde::{Deserialize, Serialize};

/// The fixed catalog of battle actions.
///
/// `Cheat` is a privileged debug strike and never appears in AI candidate
/// lists or normal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Basic physical strike.
    Strike,
    /// Magic strike, resolved against the target's magic.
    Hex,
    /// Variable strike with a wide damage roll.
    WildSwing,
    /// High-ceiling strike with a secondary crit chance.
    Burst,
    /// Self-heal.
    Mend,
    /// Defense buff.
    Harden,
    /// Offense buff.
    Sharpen,
    /// Equalizing strike: damage and heal scaled by the HP-percentage gap.
    Equalize,
    /// Near-lethal deterministic strike, admin-only.
    Cheat,
}

/// Which stat a buff move raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffStat {
    Attack,
    Defense,
}

/// The four formula shapes a move can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveKind {
    Damage,
    DamageCrit { crit_percent: u8, crit_factor: f64 },
    Heal,
    Buff(BuffStat),
    /// Simultaneous damage + heal scaled by the HP-percentage gap.
    Drain,
}

/// Static data for one move: formula shape, power scalar, dodge profile,
/// and the damage cap as a percentage of the target's max HP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveData {
    pub kind: MoveKind,
    pub power: f64,
    /// Dodge chance when the actor's previous move was different.
    pub base_dodge_percent: u8,
    /// Dodge chance when the actor telegraphs by repeating the move.
    pub repeat_dodge_percent: u8,
    pub damage_cap_percent: u8,
}

/// Look up the static data for a move.
pub fn get_move_data(move_: Move) -> MoveData {
    match move_ {
        Move::Strike => MoveData {
            kind: MoveKind::Damage,
            power: 1.5,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 30,
        },
        Move::Hex => MoveData {
            kind: MoveKind::Damage,
            power: 1.6,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 30,
        },
        Move::WildSwing => MoveData {
            kind: MoveKind::Damage,
            power: 1.8,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 30,
        },
        // The burst ceiling is compensated by a much riskier dodge profile.
        Move::Burst => MoveData {
            kind: MoveKind::DamageCrit {
                crit_percent: 25,
                crit_factor: 1.5,
            },
            power: 2.4,
            base_dodge_percent: 50,
            repeat_dodge_percent: 90,
            damage_cap_percent: 50,
        },
        Move::Mend => MoveData {
            kind: MoveKind::Heal,
            power: 0.25,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 0,
        },
        Move::Harden => MoveData {
            kind: MoveKind::Buff(BuffStat::Defense),
            power: 0.2,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 0,
        },
        Move::Sharpen => MoveData {
            kind: MoveKind::Buff(BuffStat::Attack),
            power: 0.2,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 0,
        },
        Move::Equalize => MoveData {
            kind: MoveKind::Drain,
            power: 0.5,
            base_dodge_percent: 10,
            repeat_dodge_percent: 70,
            damage_cap_percent: 30,
        },
        Move::Cheat => MoveData {
            kind: MoveKind::Damage,
            power: 0.0,
            base_dodge_percent: 0,
            repeat_dodge_percent: 0,
            damage_cap_percent: 100,
        },
    }
}

impl Move {
    /// Every move an AI participant may consider.
    pub const CANDIDATES: [Move; 8] = [
        Move::Strike,
        Move::Hex,
        Move::WildSwing,
        Move::Burst,
        Move::Mend,
        Move::Harden,
        Move::Sharpen,
        Move::Equalize,
    ];

    /// Parse a reply string into a move. Case- and whitespace-insensitive.
    /// Unknown text returns None; callers turn that into a flavor no-op.
    pub fn parse(text: &str) -> Option<Move> {
        let normalized: String = text
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "strike" => Some(Move::Strike),
            "hex" => Some(Move::Hex),
            "wildswing" => Some(Move::WildSwing),
            "burst" => Some(Move::Burst),
            "mend" => Some(Move::Mend),
            "harden" => Some(Move::Harden),
            "sharpen" => Some(Move::Sharpen),
            "equalize" => Some(Move::Equalize),
            "cheat" => Some(Move::Cheat),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Strike => "Strike",
            Move::Hex => "Hex",
            Move::WildSwing => "Wild Swing",
            Move::Burst => "Burst",
            Move::Mend => "Mend",
            Move::Harden => "Harden",
            Move::Sharpen => "Sharpen",
            Move::Equalize => "Equalize",
            Move::Cheat => "Cheat",
        }
    }

    /// True for moves whose primary output is damage.
    pub fn is_damage(self) -> bool {
        matches!(
            get_move_data(self).kind,
            MoveKind::Damage | MoveKind::DamageCrit { .. } | MoveKind::Drain
        )
    }
}
