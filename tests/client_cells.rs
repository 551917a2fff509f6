mod common;

use abs_scpi::{CellFault, CellMode, CellPrecisionMode, CellSenseRange, ErrorCode};
use common::{client_with, FakeDriver};

#[test]
fn test_enable_single_and_all() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.enable_cell(0, true).unwrap();
    client.enable_cell(7, false).unwrap();
    client.enable_all_cells(true).unwrap();

    assert_eq!(fake.writes(), vec!["OUTP1 1\r\n", "OUTP8 0\r\n", "OUTP 1,(@1:8)\r\n"]);
}

#[test]
fn test_enable_masked_channel_lists() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.enable_cells_masked(0b0000_0101, true).unwrap();
    client.enable_cells_masked(0xFF, false).unwrap();
    client.enable_cells_masked(0xFF00, true).unwrap();
    client.enable_cells_masked(0, true).unwrap();

    assert_eq!(
        fake.writes(),
        vec!["OUTP 1,(@1,3)\r\n", "OUTP 0,(@1:8)\r\n"],
        "masks with no valid cell must not be sent"
    );
}

#[test]
fn test_index_out_of_range_sends_nothing() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    assert_eq!(client.enable_cell(8, true), Err(ErrorCode::ChannelIndexOutOfRange));
    assert_eq!(client.set_cell_voltage(8, 1.0), Err(ErrorCode::ChannelIndexOutOfRange));
    assert_eq!(client.get_cell_fault(9), Err(ErrorCode::ChannelIndexOutOfRange));
    assert_eq!(client.measure_cell_current(100), Err(ErrorCode::ChannelIndexOutOfRange));

    assert!(fake.writes().is_empty());
    assert_eq!(fake.read_count(), 0);
}

#[test]
fn test_enable_queries() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    fake.reply("1\r\n");
    assert_eq!(client.get_cell_enabled(2), Ok(true));
    assert_eq!(fake.last_write(), "OUTP3?\r\n");

    fake.reply("1,0,1,1,0,0,0,1\r\n");
    assert_eq!(client.get_all_cells_enabled_masked(), Ok(0b1000_1101));
    assert_eq!(fake.last_write(), "OUTP? (@1:8)\r\n");

    fake.reply("1,0,1\r\n");
    assert_eq!(client.get_all_cells_enabled(), Err(ErrorCode::InvalidResponse));
}

#[test]
fn test_voltage_setpoints_are_clamped_and_formatted() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_voltage(0, 1.5).unwrap();
    client.set_cell_voltage(1, 7.0).unwrap();
    client.set_cell_voltage(2, -1.0).unwrap();
    client.set_all_cell_voltage(3.3).unwrap();
    client.set_cell_voltage_masked(0b1100_0000, 2.0).unwrap();

    assert_eq!(
        fake.writes(),
        vec![
            "SOUR1:VOLT 1.5000\r\n",
            "SOUR2:VOLT 5.0000\r\n",
            "SOUR3:VOLT 0.0000\r\n",
            "SOUR:VOLT 3.3000,(@1:8)\r\n",
            "SOUR:VOLT 2.0000,(@7,8)\r\n",
        ]
    );
}

#[test]
fn test_current_limits_use_their_own_ranges() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_sourcing(0, 6.0).unwrap();
    client.set_cell_sourcing(1, -1.0).unwrap();
    client.set_cell_sinking(0, -6.0).unwrap();
    client.set_cell_sinking(1, -2.5).unwrap();
    client.set_all_cell_sinking(9.0).unwrap();
    client.set_cell_sourcing_masked(0b10, 1.0).unwrap();

    assert_eq!(
        fake.writes(),
        vec![
            "SOUR1:CURR:SRC 5.0000\r\n",
            "SOUR2:CURR:SRC 0.0000\r\n",
            "SOUR1:CURR:SNK -5.0000\r\n",
            "SOUR2:CURR:SNK -2.5000\r\n",
            "SOUR:CURR:SNK 5.0000,(@1:8)\r\n",
            "SOUR:CURR:SRC 1.0000,(@2)\r\n",
        ]
    );
}

#[test]
fn test_bulk_set_is_one_transmission() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_voltages(&[1.0, 2.0, 9.0]).unwrap();
    client.set_cell_sourcing_limits(&[0.5]).unwrap();

    assert_eq!(
        fake.writes(),
        vec![
            "SOUR1:VOLT 1.0000;SOUR2:VOLT 2.0000;SOUR3:VOLT 5.0000\r\n",
            "SOUR1:CURR:SRC 0.5000\r\n",
        ]
    );
}

#[test]
fn test_bulk_set_bounds() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    assert_eq!(client.set_cell_voltages(&[1.0; 9]), Err(ErrorCode::InvalidArgument));
    assert_eq!(client.set_cell_sinking_limits(&[]), Ok(()));
    assert!(fake.writes().is_empty(), "rejected and empty bulk sets must not transmit");

    client.set_cell_sinking_limits(&[0.0; 8]).unwrap();
    assert_eq!(fake.writes().len(), 1);
}

#[test]
fn test_setpoint_queries() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    fake.reply("2.5000\r\n");
    assert_eq!(client.get_cell_voltage_target(4), Ok(2.5));
    assert_eq!(fake.last_write(), "SOUR5:VOLT?\r\n");

    fake.reply("1,2,3,4,5,6,7,8\r\n");
    assert_eq!(
        client.get_all_cell_sinking_limits(),
        Ok([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
    );
    assert_eq!(fake.last_write(), "SOUR:CURR:SNK? (@1:8)\r\n");

    fake.reply("0.1\r\n");
    assert_eq!(client.get_cell_sourcing_limit(0), Ok(0.1));
    assert_eq!(fake.last_write(), "SOUR1:CURR:SRC?\r\n");
}

#[test]
fn test_read_into_buffer() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    let mut out = [0.0f32; 3];
    fake.reply("1.5,2.5,3.5\r\n");
    client.read_cell_voltage_targets(&mut out).unwrap();
    assert_eq!(out, [1.5, 2.5, 3.5]);
    assert_eq!(fake.last_write(), "SOUR:VOLT? (@1:3)\r\n");

    let mut none: [f32; 0] = [];
    client.read_cell_voltages(&mut none).unwrap();
    assert_eq!(fake.writes().len(), 1, "empty buffer is a no-op");

    let mut too_big = [0.0f32; 9];
    assert_eq!(client.read_cell_currents(&mut too_big), Err(ErrorCode::InvalidArgument));
    assert_eq!(fake.writes().len(), 1);

    fake.reply("1.5,2.5\r\n");
    assert_eq!(
        client.read_cell_voltage_targets(&mut out),
        Err(ErrorCode::InvalidResponse),
        "reply arity must match the buffer"
    );
}

#[test]
fn test_faults_use_short_keywords_out_and_long_keywords_back() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_fault(0, CellFault::OpenCircuit).unwrap();
    client.set_all_cell_fault(CellFault::None).unwrap();
    client.set_cell_fault_masked(0b11, CellFault::Polarity).unwrap();
    client.set_cell_faults(&[CellFault::ShortCircuit, CellFault::None]).unwrap();
    assert_eq!(
        fake.writes(),
        vec![
            "OUTP1:FAUL OPEN\r\n",
            "OUTP:FAUL NONE,(@1:8)\r\n",
            "OUTP:FAUL POL,(@1,2)\r\n",
            "OUTP1:FAUL SHORT;OUTP2:FAUL NONE\r\n",
        ]
    );

    fake.reply("SHORTCIRCUIT\r\n");
    assert_eq!(client.get_cell_fault(3), Ok(CellFault::ShortCircuit));
    assert_eq!(fake.last_write(), "OUTP4:FAUL?\r\n");

    // The short command keyword is not a valid reply.
    fake.reply("SHORT\r\n");
    assert_eq!(client.get_cell_fault(3), Err(ErrorCode::InvalidResponse));

    fake.reply("NONE,OPENCIRCUIT,SHORTCIRCUIT,POLARITY,NONE,NONE,NONE,NONE\r\n");
    let faults = client.get_all_cell_faults().unwrap();
    assert_eq!(faults[1], CellFault::OpenCircuit);
    assert_eq!(faults[3], CellFault::Polarity);
    assert_eq!(fake.last_write(), "OUTP:FAUL? (@1:8)\r\n");

    let mut two = [CellFault::None; 2];
    fake.reply("POLARITY,NONE\r\n");
    client.read_cell_faults(&mut two).unwrap();
    assert_eq!(two, [CellFault::Polarity, CellFault::None]);
    assert_eq!(fake.last_write(), "OUTP:FAUL? (@1:2)\r\n");
}

#[test]
fn test_sense_range_keywords() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_sense_range(1, CellSenseRange::Low).unwrap();
    client.set_all_cell_sense_range(CellSenseRange::High).unwrap();
    client.set_cell_sense_ranges(&[CellSenseRange::Auto]).unwrap();
    assert_eq!(
        fake.writes(),
        vec!["SENS2:RANG LO\r\n", "SENS:RANG HI,(@1:8)\r\n", "SENS1:RANG AUTO\r\n"]
    );

    fake.reply("HIGH\r\n");
    assert_eq!(client.get_cell_sense_range(0), Ok(CellSenseRange::High));

    fake.reply("AUTO,LOW,HIGH,AUTO,AUTO,AUTO,AUTO,BOGUS\r\n");
    assert_eq!(client.get_all_cell_sense_ranges(), Err(ErrorCode::InvalidResponse));
}

#[test]
fn test_precision_mode() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    client.set_cell_precision_mode(CellPrecisionMode::HighPrecision).unwrap();
    assert_eq!(fake.last_write(), "CONF:MEAS:MODE PREC\r\n");

    fake.reply("FILTER\r\n");
    assert_eq!(client.get_cell_precision_mode(), Ok(CellPrecisionMode::NoiseRejection));
    assert_eq!(fake.last_write(), "CONF:MEAS:MODE?\r\n");

    fake.reply("FILT\r\n");
    assert_eq!(client.get_cell_precision_mode(), Err(ErrorCode::InvalidResponse));
}

#[test]
fn test_measurements() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    fake.reply("3.7012\r\n");
    assert_eq!(client.measure_cell_voltage(0), Ok(3.7012));
    assert_eq!(fake.last_write(), "MEAS1:VOLT?\r\n");

    fake.reply("-0.25\r\n");
    assert_eq!(client.measure_cell_current(7), Ok(-0.25));
    assert_eq!(fake.last_write(), "MEAS8:CURR?\r\n");

    fake.reply("1,1,1,1,2,2,2,2\r\n");
    assert_eq!(client.measure_all_cell_voltages(), Ok([1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0]));
    assert_eq!(fake.last_write(), "MEAS:VOLT? (@1:8)\r\n");

    fake.reply("0.5\r\n");
    assert_eq!(client.measure_average_cell_voltage(2), Ok(0.5));
    assert_eq!(fake.last_write(), "MEAS3:VOLT:AVER?\r\n");

    fake.reply("0.1,0.2\r\n");
    let mut out = [0.0f32; 2];
    client.read_average_cell_currents(&mut out).unwrap();
    assert_eq!(out, [0.1, 0.2]);
    assert_eq!(fake.last_write(), "MEAS:CURR:AVER? (@1:2)\r\n");

    fake.reply("not-a-number\r\n");
    assert_eq!(client.measure_cell_voltage(0), Err(ErrorCode::InvalidResponse));
}

#[test]
fn test_operating_mode() {
    let fake = FakeDriver::new();
    let client = client_with(&fake);

    fake.reply("ILIM\r\n");
    assert_eq!(client.get_cell_operating_mode(5), Ok(CellMode::CurrentLimited));
    assert_eq!(fake.last_write(), "OUTP6:MODE?\r\n");

    fake.reply("CV,CV,CV,CV,ILIM,CV,CV,CV\r\n");
    let modes = client.get_all_cell_operating_modes().unwrap();
    assert_eq!(modes[4], CellMode::CurrentLimited);
    assert_eq!(modes[0], CellMode::ConstantVoltage);
    assert_eq!(fake.last_write(), "OUTP:MODE? (@1:8)\r\n");
}
