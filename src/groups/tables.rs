//! Built-in airline cohorts for the German coordinated airports, 2015-2019.
//!
//! Registration order matters: [`default_groups`] lists the cohorts in
//! priority order, and the first cohort to claim a code keeps it.

use super::AirlineGroup;

pub const LUFTHANSA_LABEL: &str = "Lufthansa Group";
pub const AIR_BERLIN_LABEL: &str = "Air Berlin Group";
pub const LOW_COST_LABEL: &str = "Low Cost Carriers";
pub const LEGACY_LABEL: &str = "Legacy Carriers";
pub const REGIONAL_LABEL: &str = "Regional & Others";

/// One row of a static membership table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Airline {
    pub iata_code: &'static str,
    pub name: &'static str,
}

impl Airline {
    const fn new(iata_code: &'static str, name: &'static str) -> Self {
        Self { iata_code, name }
    }
}

pub static LUFTHANSA_GROUP: &[Airline] = &[
    Airline::new("LH", "Deutsche Lufthansa AG"),
    Airline::new("XG", "SunExpress Deutschland GmbH"),
    Airline::new("XQ", "SunExpress"),
    Airline::new("OS", "Austrian Airlines AG dba Austrian"),
    Airline::new("LX", "Swiss International Air Lines Ltd"),
    Airline::new("SN", "Brussels Airlines"),
    Airline::new("EW", "Eurowings GmbH"),
    Airline::new("WK", "Edelweiss Air AG"),
    Airline::new("4U", "Germanwings GmbH"),
    Airline::new("CL", "Lufthansa CityLine Gmbh"),
    Airline::new("EN", "Air Dolomiti S.p.A. Aeree Regionali Europee"),
    Airline::new("LZ", "Swiss Global Air Lines AG"),
    Airline::new("E2", "Eurowings Europe GmbH"),
];

pub static AIR_BERLIN_GROUP: &[Airline] = &[
    Airline::new("AB", "Air Berlin Aviation Gmbh"),
    Airline::new("H3", "Air Berlin Aviation Gmbh"),
    Airline::new("HG*", "NL LUFTFAHRT GMBH"),
    Airline::new("HE", "LGW - Luftfahrtgesellschaft Walter GmbH"),
    Airline::new("OE", "LAUDAMOTION GMBH"),
];

pub static LOW_COST_CARRIERS: &[Airline] = &[
    Airline::new("LS", "Jet2.com Limited"),
    Airline::new("DY", "Norwegian Air Shuttle A.S"),
    Airline::new("PC", "Pegasus Hava Tasimaciligi A.S."),
    Airline::new("FR", "Ryanair Ltd."),
    Airline::new("HV", "Transavia Airlines"),
    Airline::new("V7", "Volotea, S.A."),
    Airline::new("VY", "Vueling Airlines S.A."),
    Airline::new("W6", "Wizz Air Hungary Ltd."),
    Airline::new("U2", "Easyjet Airline Company Limited"),
    Airline::new("EJU", "Easyjet Austria"),
    Airline::new("EZS", "EASYJET SWITZERLAND"),
    Airline::new("EZY", "EASYJET UK"),
    Airline::new("SA", "Blue Air Aviation"),
    Airline::new("XC", "Turistik Hava Tasimacilik A.S. (Corendon Airlines)"),
    Airline::new("DE", "Condor Flugdienst GmbH"),
    Airline::new("BE", "Flybe Limited"),
    Airline::new("CO", "Cobaltair Ltd"),
    Airline::new("DS", "Easyjet Switzerland S.A."),
    Airline::new("ST", "Germania Fluggessellschaft mbH"),
    Airline::new("2L", "Helvetic Airways AG"),
    Airline::new("8Q", "Onur Air Tasimacilik A.S"),
    Airline::new("QS", "Smartwings a.s."),
    Airline::new("TO", "Transavia France"),
    Airline::new("TB", "TUI Airlines Belgium N.V"),
    Airline::new("X3", "TUIfly GmbH"),
    Airline::new("EL", "Ellinair S.A"),
];

pub static LEGACY_CARRIERS: &[Airline] = &[
    Airline::new("KF", "Air Belgium SA"),
    Airline::new("SK", "Scandinavian Airlines System"),
    Airline::new("IG", "Air Italy S.p.A dba Air Italy S.p.A."),
    Airline::new("FB", "Bulgaria Air"),
    Airline::new("OU", "Croatia Airlines"),
    Airline::new("LG", "Luxair"),
    Airline::new("KM", "Air Malta p.l.c."),
    Airline::new("SU", "PJSC Aeroflot"),
    Airline::new("A3", "Aegean Airlines S.A."),
    Airline::new("BT", "Air Baltic Corporation AS"),
    Airline::new("JP", "Adria Airways d.o.o."),
    Airline::new("FI", "Icelandair"),
    Airline::new("JU", "JSC for Air Traffic-Air SERBIA Belgrade t/a Air Serbia a.d. Beograd"),
    Airline::new("PS", "Private Stock Company Ukraine International Airlines"),
    Airline::new("TK", "Turkish Airlines Inc."),
    Airline::new("KL", "KLM Royal Dutch Airlines"),
    Airline::new("LO", "LOT  Polish Airlines"),
    Airline::new("TP", "TAP Portugal"),
    Airline::new("EI", "Aer Lingus Limited"),
    Airline::new("AF", "Air France"),
    Airline::new("AZ", "Alitalia - Societa Aerea Italiana S.p.A"),
    Airline::new("BA", "British Airways p.l.c."),
    Airline::new("AY", "Finnair Oyj"),
    Airline::new("OK", "Czech Airlines a.s., CSA"),
    Airline::new("RO", "Compania Nationala de Transporturi Aeriene Romane TAROM S.A."),
    Airline::new("IB", "Iberia Lineas Aereas de Espana Sociedad Anonima Operadora"),
];

pub static REGIONAL_AND_OTHERS: &[Airline] = &[
    Airline::new("MT", "Thomas Cook Airlines"),
    Airline::new("BY", "TUI Airways"),
    Airline::new("LM", "Loganair"),
    Airline::new("WF", "Widerøe"),
    Airline::new("H6", "European Air Charter"),
    Airline::new("NT", "Binter Canarias"),
];

/// All built-in cohorts in registration priority order.
pub fn default_groups() -> Vec<AirlineGroup> {
    [
        (LUFTHANSA_LABEL, LUFTHANSA_GROUP),
        (AIR_BERLIN_LABEL, AIR_BERLIN_GROUP),
        (LOW_COST_LABEL, LOW_COST_CARRIERS),
        (LEGACY_LABEL, LEGACY_CARRIERS),
        (REGIONAL_LABEL, REGIONAL_AND_OTHERS),
    ]
    .into_iter()
    .map(|(label, table)| AirlineGroup::new(label, table.iter().map(|a| a.iata_code)))
    .collect()
}
