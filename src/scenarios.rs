use clap::ValueEnum;

/// Canned demo queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    UnpaidOvertime,
    LandlordMold,
    IceEncounter,
    DomesticViolence,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::UnpaidOvertime,
        Scenario::LandlordMold,
        Scenario::IceEncounter,
        Scenario::DomesticViolence,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Scenario::UnpaidOvertime => "Unpaid overtime wages",
            Scenario::LandlordMold => "Landlord won't fix mold",
            Scenario::IceEncounter => "ICE encounter as immigrant",
            Scenario::DomesticViolence => "Domestic violence emergency",
        }
    }

    pub fn query(self) -> &'static str {
        match self {
            Scenario::UnpaidOvertime => "My boss hasn't paid me overtime for the last 3 months. I work 50 hours per week as a server at a restaurant in Boston. They only pay me regular hourly rate.",
            Scenario::LandlordMold => "There's black mold growing in my bathroom and bedroom. I told my landlord 3 weeks ago in writing but they haven't fixed it. The lease says they're responsible for repairs.",
            Scenario::IceEncounter => "I'm an international student on F-1 visa. I'm worried about ICE enforcement in my area. What are my rights if approached by immigration officers?",
            Scenario::DomesticViolence => "My partner physically attacked me and is threatening me. I'm scared and don't know what to do. I need help immediately.",
        }
    }

    /// Cycle through `None` (custom query) and each scenario.
    pub fn cycle(current: Option<Scenario>, forward: bool) -> Option<Scenario> {
        let slots = Scenario::ALL.len() + 1;
        let idx = current
            .and_then(|s| Scenario::ALL.iter().position(|x| *x == s))
            .map(|i| i + 1)
            .unwrap_or(0);
        let next = if forward {
            (idx + 1) % slots
        } else {
            (idx + slots - 1) % slots
        };
        next.checked_sub(1).map(|i| Scenario::ALL[i])
    }
}
