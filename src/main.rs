fn main() -> anyhow::Result<()> {
  lift_log_lib::run()
}
